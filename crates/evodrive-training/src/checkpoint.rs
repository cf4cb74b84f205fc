use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, Write as _},
    path::PathBuf,
};

use chrono::Local;
use evodrive_genome::{Genome, GenomeData};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::{config::TrainingConfig, error::PersistError};

/// Stage folder searched when a bare checkpoint name is missing from the
/// configured stage.
const FALLBACK_STAGE: &str = "Stage1";

/// Point-in-time copy of the population plus its generation index.
///
/// Written as human-readable JSON; immutable once on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckpointSnapshot {
    pub generation: u32,
    pub total_population: usize,
    pub genomes: Vec<GenomeData>,
}

impl CheckpointSnapshot {
    /// Snapshots a population.
    #[must_use]
    pub fn capture(generation: u32, genomes: &[Genome]) -> Self {
        Self {
            generation,
            total_population: genomes.len(),
            genomes: genomes.iter().map(Genome::export_weights).collect(),
        }
    }

    /// Rebuilds the population, every fitness reset to unevaluated.
    ///
    /// A genome count differing from `expected_population` is a warning, not
    /// an error: the loaded count becomes authoritative for the run and all
    /// downstream sizing keys off it.
    #[must_use]
    pub fn restore(self, expected_population: usize) -> (u32, Vec<Genome>) {
        if self.genomes.len() != expected_population {
            warn!(
                "population size mismatch: checkpoint has {}, configuration expects {}; \
                 continuing with the loaded population",
                self.genomes.len(),
                expected_population,
            );
        }
        let genomes = self.genomes.into_iter().map(Genome::from_data).collect();
        (self.generation, genomes)
    }
}

/// Saves and restores population snapshots under the run's data directory.
///
/// Layout: `<root>/<stage>/<checkpoint dir>/<base>_Gen<g>_<timestamp>.json`,
/// directories created on demand.
#[derive(Debug)]
pub struct CheckpointStore {
    root: PathBuf,
    stage: String,
    dir_name: String,
    base_name: String,
}

impl CheckpointStore {
    #[must_use]
    pub fn new(root: PathBuf, stage: String, dir_name: String, base_name: String) -> Self {
        Self {
            root,
            stage,
            dir_name,
            base_name,
        }
    }

    #[must_use]
    pub fn from_config(config: &TrainingConfig) -> Self {
        Self::new(
            config.data_root.clone(),
            config.stage_name.clone(),
            config.checkpoint_dir_name.clone(),
            config.base_save_name.clone(),
        )
    }

    fn stage_dir(&self, stage: &str) -> PathBuf {
        self.root.join(stage).join(&self.dir_name)
    }

    /// Writes the snapshot, returning the path of the new file.
    pub fn save(&self, snapshot: &CheckpointSnapshot) -> Result<PathBuf, PersistError> {
        let dir = self.stage_dir(&self.stage);
        fs::create_dir_all(&dir)?;

        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let path = dir.join(format!(
            "{}_Gen{}_{}.json",
            self.base_name, snapshot.generation, timestamp
        ));

        let mut writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(&mut writer, snapshot)?;
        writer.flush()?;
        Ok(path)
    }

    /// Loads the snapshot named by `request`.
    ///
    /// A request containing `/` is a structured path relative to the data
    /// root; a bare filename resolves against the configured stage's
    /// checkpoint directory, then against the [`FALLBACK_STAGE`] directory
    /// before reporting [`PersistError::NotFound`].
    pub fn load(&self, request: &str) -> Result<CheckpointSnapshot, PersistError> {
        let primary = if request.contains('/') {
            self.root.join(request)
        } else {
            self.stage_dir(&self.stage).join(request)
        };

        let path = if primary.exists() {
            primary
        } else {
            let fallback = self.stage_dir(FALLBACK_STAGE).join(request);
            if fallback.exists() {
                warn!(
                    "checkpoint not found at {}, using fallback {}",
                    primary.display(),
                    fallback.display(),
                );
                fallback
            } else {
                return Err(PersistError::NotFound { primary, fallback });
            }
        };

        let reader = BufReader::new(File::open(&path)?);
        let snapshot = serde_json::from_reader(reader)?;
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use evodrive_genome::NetworkShape;
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    const SHAPE: NetworkShape = NetworkShape {
        input_size: 3,
        hidden_size: 4,
        hidden_layers: 1,
        output_size: 1,
    };

    fn store_in(root: &std::path::Path, stage: &str) -> CheckpointStore {
        CheckpointStore::new(
            root.to_path_buf(),
            stage.to_owned(),
            "Checkpoints".to_owned(),
            "CarEvolution".to_owned(),
        )
    }

    fn population(count: usize) -> Vec<Genome> {
        let mut rng = Pcg32::seed_from_u64(31);
        (0..count).map(|_| Genome::random(&mut rng, SHAPE)).collect()
    }

    #[test]
    fn save_then_load_roundtrips_weights_and_generation() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path(), "Stage2");
        let genomes = population(4);

        let path = store.save(&CheckpointSnapshot::capture(7, &genomes)).unwrap();
        let name = path.file_name().unwrap().to_str().unwrap().to_owned();
        assert!(name.starts_with("CarEvolution_Gen7_"));
        assert!(name.ends_with(".json"));

        let snapshot = store.load(&name).unwrap();
        assert_eq!(snapshot.generation, 7);
        assert_eq!(snapshot.total_population, 4);

        let (generation, restored) = snapshot.restore(4);
        assert_eq!(generation, 7);
        assert_eq!(restored.len(), 4);
        for (original, loaded) in genomes.iter().zip(&restored) {
            assert_eq!(original.export_weights(), loaded.export_weights());
            assert!(!loaded.is_evaluated());
        }
    }

    #[test]
    fn size_mismatch_proceeds_with_loaded_count() {
        let snapshot = CheckpointSnapshot::capture(3, &population(8));
        let (generation, restored) = snapshot.restore(10);
        assert_eq!(generation, 3);
        assert_eq!(restored.len(), 8);
    }

    #[test]
    fn bare_name_falls_back_to_stage1() {
        let dir = tempfile::tempdir().unwrap();
        let writer = store_in(dir.path(), "Stage1");
        let path = writer
            .save(&CheckpointSnapshot::capture(2, &population(3)))
            .unwrap();
        let name = path.file_name().unwrap().to_str().unwrap().to_owned();

        let reader = store_in(dir.path(), "Stage3");
        let snapshot = reader.load(&name).unwrap();
        assert_eq!(snapshot.generation, 2);
    }

    #[test]
    fn structured_path_resolves_against_the_root() {
        let dir = tempfile::tempdir().unwrap();
        let writer = store_in(dir.path(), "Stage2");
        let path = writer
            .save(&CheckpointSnapshot::capture(5, &population(2)))
            .unwrap();
        let name = path.file_name().unwrap().to_str().unwrap();

        let reader = store_in(dir.path(), "Stage3");
        let request = format!("Stage2/Checkpoints/{name}");
        let snapshot = reader.load(&request).unwrap();
        assert_eq!(snapshot.generation, 5);
    }

    #[test]
    fn missing_file_reports_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path(), "Stage2");
        let err = store.load("nope.json").unwrap_err();
        assert!(matches!(err, PersistError::NotFound { .. }));
    }

    #[test]
    fn malformed_content_reports_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path(), "Stage1");
        let checkpoints = dir.path().join("Stage1").join("Checkpoints");
        fs::create_dir_all(&checkpoints).unwrap();
        fs::write(checkpoints.join("bad.json"), "{ not json").unwrap();

        let err = store.load("bad.json").unwrap_err();
        assert!(matches!(err, PersistError::Parse(_)));
    }
}
