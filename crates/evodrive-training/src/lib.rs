//! Neuroevolution training scheduler.
//!
//! This crate coordinates the generational lifecycle of a controller
//! population:
//!
//! 1. **Evaluate**: [`scheduler::EpisodeScheduler`] pairs genomes from the
//!    backlog with a bounded pool of concurrently-running trials, stepping
//!    every active pairing once per caller-driven `tick()` and collecting
//!    final rewards as fitness.
//! 2. **Select**: once every genome has been evaluated exactly once,
//!    [`selection::SelectionEngine`] produces the next population through
//!    elitism plus tournament selection and mutation.
//! 3. **Record**: [`stats::StatsRecorder`] appends one summary row per
//!    generation, and [`checkpoint::CheckpointStore`] persists and restores
//!    population snapshots.
//!
//! Everything is single-threaded and cooperative: the caller owns the loop,
//! no operation blocks, and persistence failures degrade to logged warnings
//! rather than aborting a run.

pub mod checkpoint;
pub mod config;
pub mod error;
pub mod scheduler;
pub mod selection;
pub mod stats;

pub use self::{
    checkpoint::{CheckpointSnapshot, CheckpointStore},
    config::TrainingConfig,
    error::PersistError,
    scheduler::{CompletedGeneration, EpisodeScheduler},
    selection::SelectionEngine,
    stats::{GenerationRecord, StatsRecorder},
};
