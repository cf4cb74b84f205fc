use std::{io, path::PathBuf};

use thiserror::Error;

/// Failures of the persistence layer.
///
/// None of these are fatal to a training run: callers log them and either
/// fall back to a fresh population (load paths) or skip the operation and
/// continue (save and stats paths).
#[derive(Debug, Error)]
pub enum PersistError {
    #[error(
        "checkpoint not found at {} (fallback tried: {})",
        .primary.display(),
        .fallback.display()
    )]
    NotFound { primary: PathBuf, fallback: PathBuf },

    #[error("malformed checkpoint content: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}
