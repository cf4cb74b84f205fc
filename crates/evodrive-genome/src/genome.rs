use rand::Rng;
use rand_distr::Normal;
use serde::{Deserialize, Serialize};

use crate::network::{Layer, Network, NetworkShape};

/// Fitness of a genome that has not finished a trial this generation.
pub const UNEVALUATED_FITNESS: f32 = -9999.0;

/// Weights clamp to this magnitude after mutation.
const WEIGHT_LIMIT: f32 = 4.0;

/// Per-weight probability of receiving Gaussian noise.
const MUTATION_RATE: f64 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MutationPhase {
    Exploration,
    Transition,
    Convergence,
}

impl MutationPhase {
    fn from_generation(generation: u32) -> Self {
        match generation {
            0..30 => Self::Exploration,
            30..80 => Self::Transition,
            _ => Self::Convergence,
        }
    }

    const fn sigma(self) -> f32 {
        match self {
            Self::Exploration => 0.5,
            Self::Transition => 0.2,
            Self::Convergence => 0.08,
        }
    }
}

/// A single individual: controller weights plus the fitness of its last
/// evaluated episode.
#[derive(Debug, Clone)]
pub struct Genome {
    network: Network,
    fitness: f32,
}

impl Genome {
    /// Creates a genome with uniformly random weights and unevaluated fitness.
    pub fn random<R>(rng: &mut R, shape: NetworkShape) -> Self
    where
        R: Rng + ?Sized,
    {
        Self {
            network: Network::random(rng, shape),
            fitness: UNEVALUATED_FITNESS,
        }
    }

    /// Runs the forward pass over a projected observation vector.
    ///
    /// Output components lie in the tanh range; the scheduler still clamps
    /// them to `[-1, 1]` before applying them to a trial.
    #[must_use]
    pub fn infer(&self, observation: &[f32]) -> Vec<f32> {
        self.network.forward(observation)
    }

    /// Returns a mutated copy of this genome.
    ///
    /// The receiver is left untouched, so elite copies can never be corrupted
    /// by reproduction. Mutation strength follows the generation schedule:
    /// wide Gaussian noise early, fine perturbations once the run converges.
    #[must_use]
    pub fn mutate<R>(&self, generation: u32, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let sigma = MutationPhase::from_generation(generation).sigma();
        let normal = Normal::new(0.0, sigma).unwrap();
        let mut network = self.network.clone();
        for layer in &mut network.layers {
            for row in &mut layer.weights {
                for w in row {
                    if rng.random_bool(MUTATION_RATE) {
                        *w = (*w + rng.sample(normal)).clamp(-WEIGHT_LIMIT, WEIGHT_LIMIT);
                    }
                }
            }
            for b in &mut layer.biases {
                if rng.random_bool(MUTATION_RATE) {
                    *b = (*b + rng.sample(normal)).clamp(-WEIGHT_LIMIT, WEIGHT_LIMIT);
                }
            }
        }
        Self {
            network,
            fitness: UNEVALUATED_FITNESS,
        }
    }

    #[must_use]
    pub fn fitness(&self) -> f32 {
        self.fitness
    }

    /// Records the final reward of the genome's finished trial.
    pub fn record_fitness(&mut self, reward: f32) {
        self.fitness = reward;
    }

    /// Marks the genome unevaluated for the next generation.
    pub fn reset_fitness(&mut self) {
        self.fitness = UNEVALUATED_FITNESS;
    }

    #[must_use]
    pub fn is_evaluated(&self) -> bool {
        self.fitness != UNEVALUATED_FITNESS
    }

    /// Snapshots the weights for persistence.
    #[must_use]
    pub fn export_weights(&self) -> GenomeData {
        GenomeData {
            layers: self.network.layers.clone(),
        }
    }

    /// Rebuilds a genome from a weight snapshot, fitness reset to the
    /// unevaluated sentinel.
    #[must_use]
    pub fn from_data(data: GenomeData) -> Self {
        Self {
            network: Network {
                layers: data.layers,
            },
            fitness: UNEVALUATED_FITNESS,
        }
    }
}

/// Serialized form of a genome's weights, as stored in checkpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenomeData {
    pub layers: Vec<Layer>,
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    const SHAPE: NetworkShape = NetworkShape {
        input_size: 3,
        hidden_size: 4,
        hidden_layers: 1,
        output_size: 2,
    };

    #[test]
    fn fresh_genome_is_unevaluated() {
        let mut rng = Pcg32::seed_from_u64(1);
        let genome = Genome::random(&mut rng, SHAPE);
        assert_eq!(genome.fitness(), UNEVALUATED_FITNESS);
        assert!(!genome.is_evaluated());
    }

    #[test]
    fn record_and_reset_fitness() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut genome = Genome::random(&mut rng, SHAPE);
        genome.record_fitness(12.5);
        assert!(genome.is_evaluated());
        assert_eq!(genome.fitness(), 12.5);
        genome.reset_fitness();
        assert!(!genome.is_evaluated());
    }

    #[test]
    fn mutate_leaves_parent_untouched() {
        let mut rng = Pcg32::seed_from_u64(3);
        let parent = Genome::random(&mut rng, SHAPE);
        let before = parent.export_weights();
        let child = parent.mutate(0, &mut rng);
        assert_eq!(parent.export_weights(), before);
        assert_ne!(child.export_weights(), before);
        assert!(!child.is_evaluated());
    }

    #[test]
    fn mutated_weights_stay_within_limit() {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut genome = Genome::random(&mut rng, SHAPE);
        for generation in 0..100 {
            genome = genome.mutate(generation, &mut rng);
        }
        let data = genome.export_weights();
        for layer in &data.layers {
            assert!(
                layer
                    .weights
                    .iter()
                    .flatten()
                    .chain(&layer.biases)
                    .all(|w| w.abs() <= WEIGHT_LIMIT)
            );
        }
    }

    #[test]
    fn weight_snapshot_roundtrip_preserves_inference() {
        let mut rng = Pcg32::seed_from_u64(5);
        let genome = Genome::random(&mut rng, SHAPE);
        let json = serde_json::to_string(&genome.export_weights()).unwrap();
        let data: GenomeData = serde_json::from_str(&json).unwrap();
        let restored = Genome::from_data(data);
        let observation = [0.25, -0.5, 0.75];
        assert_eq!(genome.infer(&observation), restored.infer(&observation));
        assert_eq!(genome.export_weights(), restored.export_weights());
        assert!(!restored.is_evaluated());
    }
}
