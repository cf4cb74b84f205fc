//! Evolvable controller genomes.
//!
//! A [`Genome`] is a single individual in the neuroevolution population: a
//! small fully-connected tanh network plus the scalar fitness its last
//! evaluated episode produced. Genomes are owned values: the scheduler moves
//! them between the backlog, the active pairings, and the evaluated set, and
//! the selection engine clones or mutates them into the next generation.
//!
//! Fitness starts at the [`UNEVALUATED_FITNESS`] sentinel and is recorded
//! exactly once per generation, when the genome's bound trial finishes.
//!
//! Weight snapshots ([`GenomeData`]) are plain serde values so checkpoints
//! stay human-readable JSON.

pub mod genome;
pub mod network;

pub use self::{
    genome::{Genome, GenomeData, UNEVALUATED_FITNESS},
    network::{Layer, Network, NetworkShape},
};
