use evodrive_genome::Genome;
use rand::{Rng, seq::IndexedRandom as _};

/// Produces the next generation from a fully-evaluated population.
///
/// Elitism copies the top genomes unchanged; the remainder is filled by
/// repeated tournaments, each appending mutated copies of the sample's two
/// best members. Children are always appended in pairs, so when
/// `population - elite_count` is odd the result overshoots the incoming size
/// by one; the overshoot is kept rather than trimmed.
#[derive(Debug)]
pub struct SelectionEngine {
    elite_count: usize,
    tournament_size: usize,
}

impl SelectionEngine {
    /// # Panics
    ///
    /// Panics if `tournament_size < 2`; every tournament must yield two
    /// parents.
    #[must_use]
    pub fn new(elite_count: usize, tournament_size: usize) -> Self {
        assert!(tournament_size >= 2, "tournament needs at least two members");
        Self {
            elite_count,
            tournament_size,
        }
    }

    /// Builds the next population.
    ///
    /// `generation` is the index of the outgoing generation and parameterizes
    /// mutation strength; the caller increments its counter afterwards.
    /// Every tournament draws a fresh uniform sample of distinct genomes from
    /// the original population, independent of prior draws.
    #[must_use]
    pub fn advance<R>(&self, population: &[Genome], generation: u32, rng: &mut R) -> Vec<Genome>
    where
        R: Rng + ?Sized,
    {
        assert!(population.len() >= 2, "population too small to reproduce");

        let mut ranked: Vec<&Genome> = population.iter().collect();
        ranked.sort_by(|a, b| b.fitness().partial_cmp(&a.fitness()).unwrap());

        let mut next = Vec::with_capacity(population.len() + 1);

        // elite selection
        next.extend(ranked.iter().take(self.elite_count).map(|g| (*g).clone()));

        // generate the rest, two children per tournament
        while next.len() < population.len() {
            let mut sample: Vec<&Genome> = population
                .choose_multiple(rng, self.tournament_size)
                .collect();
            sample.sort_by(|a, b| b.fitness().partial_cmp(&a.fitness()).unwrap());
            next.push(sample[0].mutate(generation, rng));
            next.push(sample[1].mutate(generation, rng));
        }
        next
    }
}
