//! Episode side of the training system.
//!
//! The scheduler in `evodrive-training` drives episodes only through the
//! [`Trial`] capability trait; the simulated agent behind it is deliberately
//! opaque. This crate provides that seam, a [`TrialPool`] that hands out
//! reusable trial slots with explicit `acquire`/`release`, and
//! [`TrackTrial`], a small deterministic corridor-driving episode used by the
//! CLI and the integration tests.

pub mod pool;
pub mod track;
pub mod trial;

pub use self::{
    pool::{TrialPool, TrialSlot},
    track::TrackTrial,
    trial::Trial,
};
