use std::path::PathBuf;

use evodrive_genome::NetworkShape;

/// Immutable configuration for one training run.
///
/// Built once (normally from CLI arguments) and passed by reference into the
/// scheduler, the selection engine, and the persistence components. Nothing
/// mutates it mid-run.
#[derive(Debug, Clone)]
pub struct TrainingConfig {
    /// Genomes per generation for a fresh population.
    pub total_population: usize,
    /// Top genomes copied unchanged into the next generation.
    pub elite_count: usize,
    /// Genomes sampled per tournament during reproduction.
    pub tournament_size: usize,
    /// Upper bound on concurrently-active trials.
    pub concurrent_trials: usize,
    /// Observation components fed to the network, in order. Indices outside
    /// a trial's observation read as `0.0`.
    pub observation_indices: Vec<usize>,
    pub hidden_size: usize,
    pub hidden_layers: usize,
    pub output_size: usize,
    /// Root directory for all run data.
    pub data_root: PathBuf,
    /// Stage subdirectory under the data root.
    pub stage_name: String,
    pub checkpoint_dir_name: String,
    pub stats_dir_name: String,
    /// Base name for checkpoint and stats files.
    pub base_save_name: String,
}

impl TrainingConfig {
    #[must_use]
    pub fn input_size(&self) -> usize {
        self.observation_indices.len()
    }

    #[must_use]
    pub fn network_shape(&self) -> NetworkShape {
        NetworkShape {
            input_size: self.input_size(),
            hidden_size: self.hidden_size,
            hidden_layers: self.hidden_layers,
            output_size: self.output_size,
        }
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            total_population: 100,
            elite_count: 4,
            tournament_size: 85,
            concurrent_trials: 4,
            observation_indices: vec![0, 1, 2],
            hidden_size: 8,
            hidden_layers: 1,
            output_size: 4,
            data_root: PathBuf::from("LearningData/NE"),
            stage_name: "Stage1".to_owned(),
            checkpoint_dir_name: "Checkpoints".to_owned(),
            stats_dir_name: "Stats".to_owned(),
            base_save_name: "CarEvolution".to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_shape_follows_observation_indices() {
        let config = TrainingConfig {
            observation_indices: vec![0, 2, 5, 7],
            ..TrainingConfig::default()
        };
        let shape = config.network_shape();
        assert_eq!(shape.input_size, 4);
        assert_eq!(shape.hidden_size, 8);
        assert_eq!(shape.hidden_layers, 1);
        assert_eq!(shape.output_size, 4);
    }
}
