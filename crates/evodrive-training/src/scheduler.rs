use std::{collections::VecDeque, mem};

use evodrive_engine::{Trial, TrialPool, TrialSlot};
use evodrive_genome::{Genome, UNEVALUATED_FITNESS};
use log::debug;

/// Multiplexes one generation of genomes over a bounded pool of trials.
///
/// Each generation the full population becomes a consuming backlog; genomes
/// are dequeued one at a time as trial slots free up, so at most
/// `min(pool capacity, population)` episodes are active at once. The caller
/// drives evaluation with [`EpisodeScheduler::tick`], one invocation per
/// fixed time step.
///
/// Within a generation the genomes are conserved:
/// `backlog + active + evaluated == population`.
#[derive(Debug)]
pub struct EpisodeScheduler<T> {
    pool: TrialPool<T>,
    observation_indices: Vec<usize>,
    backlog: VecDeque<Genome>,
    active: Vec<Pairing>,
    evaluated: Vec<Genome>,
    reward_sum: f32,
    generation_best: f32,
}

#[derive(Debug)]
struct Pairing {
    slot: TrialSlot,
    genome: Genome,
}

/// A fully-evaluated generation, handed back exactly once by
/// [`EpisodeScheduler::tick`].
#[derive(Debug)]
pub struct CompletedGeneration {
    /// Every genome of the generation, fitness recorded, in completion order.
    pub genomes: Vec<Genome>,
    pub best_reward: f32,
    pub average_reward: f32,
}

impl<T: Trial> EpisodeScheduler<T> {
    #[must_use]
    pub fn new(pool: TrialPool<T>, observation_indices: Vec<usize>) -> Self {
        Self {
            pool,
            observation_indices,
            backlog: VecDeque::new(),
            active: Vec::new(),
            evaluated: Vec::new(),
            reward_sum: 0.0,
            generation_best: UNEVALUATED_FITNESS,
        }
    }

    /// Begins evaluating a new generation.
    ///
    /// The population becomes the backlog in its given order, every fitness
    /// is reset to the unevaluated sentinel, and as many pairings as the
    /// pool allows are activated immediately.
    pub fn start_generation(&mut self, population: Vec<Genome>) {
        for pairing in self.active.drain(..) {
            self.pool.release(pairing.slot);
        }
        self.evaluated.clear();
        self.reward_sum = 0.0;
        self.generation_best = UNEVALUATED_FITNESS;
        self.backlog = population
            .into_iter()
            .map(|mut genome| {
                genome.reset_fitness();
                genome
            })
            .collect();
        self.refill();
    }

    /// Advances every active episode by one step.
    ///
    /// For each unfinished pairing, in fixed iteration order: project the
    /// trial's observation through the configured index list, infer, clamp
    /// every action component to `[-1, 1]`, apply. Pairings whose trial has
    /// finished are then swept: the trial is stopped and its slot released,
    /// and the final reward becomes the genome's fitness. Freed capacity is
    /// refilled from the backlog.
    ///
    /// Returns the evaluated generation on the tick that completes it.
    /// Further ticks are no-ops (and return `None`) until
    /// [`EpisodeScheduler::start_generation`] is called again.
    #[expect(clippy::cast_precision_loss)]
    pub fn tick(&mut self) -> Option<CompletedGeneration> {
        if self.active.is_empty() && self.backlog.is_empty() {
            return None;
        }

        for pairing in &mut self.active {
            let trial = self.pool.get_mut(pairing.slot);
            if trial.is_finished() {
                continue;
            }
            let observation = trial.observation();
            let projected = project_observation(&observation, &self.observation_indices);
            let action = clamp_action(&pairing.genome.infer(&projected));
            self.pool.get_mut(pairing.slot).apply_action(&action);
        }

        let total = self.population_len();
        let active = mem::take(&mut self.active);
        for mut pairing in active {
            if self.pool.get(pairing.slot).is_finished() {
                let trial = self.pool.get_mut(pairing.slot);
                trial.stop();
                let reward = trial.final_reward();
                self.pool.release(pairing.slot);
                pairing.genome.record_fitness(reward);
                self.reward_sum += reward;
                self.generation_best = self.generation_best.max(reward);
                self.evaluated.push(pairing.genome);
                debug!(
                    "episode finished with reward {reward:.3} ({} / {total} evaluated)",
                    self.evaluated.len(),
                );
            } else {
                self.active.push(pairing);
            }
        }

        if self.backlog.is_empty() && self.active.is_empty() {
            let genomes = mem::take(&mut self.evaluated);
            return Some(CompletedGeneration {
                best_reward: self.generation_best,
                average_reward: self.reward_sum / genomes.len() as f32,
                genomes,
            });
        }

        self.refill();
        None
    }

    fn refill(&mut self) {
        while !self.backlog.is_empty() {
            let Some(slot) = self.pool.acquire() else {
                break;
            };
            let genome = self.backlog.pop_front().unwrap();
            self.pool.get_mut(slot).reset();
            self.active.push(Pairing { slot, genome });
        }
    }

    /// Genomes still waiting for a trial slot.
    #[must_use]
    pub fn backlog_len(&self) -> usize {
        self.backlog.len()
    }

    /// Currently-running pairings.
    #[must_use]
    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    /// Genomes already evaluated this generation.
    #[must_use]
    pub fn evaluated_len(&self) -> usize {
        self.evaluated.len()
    }

    /// Size of the generation currently being evaluated.
    #[must_use]
    pub fn population_len(&self) -> usize {
        self.backlog.len() + self.active.len() + self.evaluated.len()
    }

    /// Fitness of every genome bound to an active pairing.
    #[must_use]
    pub fn active_fitness(&self) -> Vec<f32> {
        self.active.iter().map(|p| p.genome.fitness()).collect()
    }
}

/// Projects an observation onto the configured subset/order of indices.
///
/// An index outside the observation's bounds yields `0.0` rather than
/// failing.
#[must_use]
pub fn project_observation(observation: &[f32], indices: &[usize]) -> Vec<f32> {
    indices
        .iter()
        .map(|&index| observation.get(index).copied().unwrap_or(0.0))
        .collect()
}

/// Clamps every action component to `[-1, 1]`.
///
/// Applied after inference regardless of the genome's own output range.
#[must_use]
pub fn clamp_action(action: &[f32]) -> Vec<f32> {
    action.iter().map(|a| a.clamp(-1.0, 1.0)).collect()
}
