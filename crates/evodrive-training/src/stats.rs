use std::{
    fs::{self, OpenOptions},
    io::Write as _,
    path::{Path, PathBuf},
};

use crate::{config::TrainingConfig, error::PersistError};

/// Summary of one completed generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationRecord {
    pub generation: u32,
    pub best_reward: f32,
    pub average_reward: f32,
}

/// Appends one CSV row per completed generation.
///
/// One file per run session (`<base>_Stats_<session timestamp>.csv` under
/// `<root>/<stage>/<stats dir>/`), opened in append mode; the header row is
/// written only when the file did not previously exist. Prior rows are never
/// truncated or rewritten.
#[derive(Debug)]
pub struct StatsRecorder {
    path: PathBuf,
}

impl StatsRecorder {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    #[must_use]
    pub fn from_config(config: &TrainingConfig, session_timestamp: &str) -> Self {
        let path = config
            .data_root
            .join(&config.stage_name)
            .join(&config.stats_dir_name)
            .join(format!(
                "{}_Stats_{}.csv",
                config.base_save_name, session_timestamp
            ));
        Self::new(path)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, record: &GenerationRecord) -> Result<(), PersistError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let header_needed = !self.path.exists();
        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)?;
        if header_needed {
            writeln!(file, "Generation,GenerationBestReward,AverageReward")?;
        }
        writeln!(
            file,
            "{},{:.4},{:.4}",
            record.generation, record.best_reward, record.average_reward
        )?;
        Ok(())
    }
}
