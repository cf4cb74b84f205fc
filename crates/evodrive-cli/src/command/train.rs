use std::{
    fs::File,
    io::{BufWriter, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use chrono::{DateTime, Local, Utc};
use clap::Args;
use evodrive_engine::{TrackTrial, TrialPool};
use evodrive_genome::{Genome, GenomeData, UNEVALUATED_FITNESS};
use evodrive_training::{
    CheckpointSnapshot, CheckpointStore, EpisodeScheduler, GenerationRecord, SelectionEngine,
    StatsRecorder, TrainingConfig,
};
use log::{error, info, warn};
use rand::{Rng, SeedableRng as _};
use rand_pcg::Pcg32;
use serde::Serialize;

#[derive(Debug, Clone, Args)]
pub(crate) struct TrainArg {
    /// Genomes per generation
    #[arg(long, default_value_t = 100)]
    population: usize,
    /// Top genomes carried over unchanged
    #[arg(long, default_value_t = 4)]
    elite: usize,
    /// Genomes sampled per tournament
    #[arg(long, default_value_t = 85)]
    tournament: usize,
    /// Concurrently active trials
    #[arg(long, default_value_t = 4)]
    agents: usize,
    /// Observation indices fed to the network, comma separated
    #[arg(long, value_delimiter = ',', default_values_t = [0_usize, 1, 2])]
    obs_index: Vec<usize>,
    #[arg(long, default_value_t = 8)]
    hidden_size: usize,
    #[arg(long, default_value_t = 1)]
    hidden_layers: usize,
    #[arg(long, default_value_t = 4)]
    output_size: usize,
    /// Generations to evaluate before stopping
    #[arg(long, default_value_t = 50)]
    generations: u32,
    /// Save a checkpoint every N generations
    #[arg(long)]
    save_every: Option<u32>,
    /// Root directory for checkpoints and stats
    #[arg(long, default_value = "LearningData/NE")]
    data_root: PathBuf,
    #[arg(long, default_value = "Stage1")]
    stage: String,
    /// Base name for checkpoint and stats files
    #[arg(long, default_value = "CarEvolution")]
    base_name: String,
    /// Resume from a checkpoint (bare filename or path relative to the data root)
    #[arg(long)]
    load: Option<String>,
    /// Seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,
    /// Write the champion genome here after the final generation
    #[arg(long)]
    output: Option<PathBuf>,
    /// Track length of the built-in driving trial
    #[arg(long, default_value_t = 100.0)]
    track_length: f32,
    /// Step limit of the built-in driving trial
    #[arg(long, default_value_t = 400)]
    max_steps: u32,
}

fn config_from(arg: &TrainArg) -> TrainingConfig {
    TrainingConfig {
        total_population: arg.population,
        elite_count: arg.elite,
        tournament_size: arg.tournament,
        concurrent_trials: arg.agents,
        observation_indices: arg.obs_index.clone(),
        hidden_size: arg.hidden_size,
        hidden_layers: arg.hidden_layers,
        output_size: arg.output_size,
        data_root: arg.data_root.clone(),
        stage_name: arg.stage.clone(),
        base_save_name: arg.base_name.clone(),
        ..TrainingConfig::default()
    }
}

/// Restores the requested checkpoint, or falls back to a fresh random
/// population at generation 0. Load failures are never fatal.
fn initial_population<R>(
    config: &TrainingConfig,
    store: &CheckpointStore,
    load: Option<&str>,
    rng: &mut R,
) -> (u32, Vec<Genome>)
where
    R: Rng + ?Sized,
{
    if let Some(request) = load {
        if request.is_empty() {
            error!("checkpoint load requested with an empty path; starting fresh");
        } else {
            match store.load(request) {
                Ok(snapshot) => {
                    let (generation, genomes) = snapshot.restore(config.total_population);
                    info!(
                        "resuming from generation {generation} with {} genomes",
                        genomes.len()
                    );
                    return (generation, genomes);
                }
                Err(e) => error!("failed to load checkpoint: {e}; starting fresh"),
            }
        }
    }
    let genomes = (0..config.total_population)
        .map(|_| Genome::random(rng, config.network_shape()))
        .collect();
    (0, genomes)
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let config = config_from(arg);
    let mut rng = match arg.seed {
        Some(seed) => Pcg32::seed_from_u64(seed),
        None => Pcg32::from_rng(&mut rand::rng()),
    };

    let session_timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let store = CheckpointStore::from_config(&config);
    let stats = StatsRecorder::from_config(&config, &session_timestamp);
    let selection = SelectionEngine::new(config.elite_count, config.tournament_size);

    let (start_generation, population) =
        initial_population(&config, &store, arg.load.as_deref(), &mut rng);
    let mut generation = start_generation;

    let pool = TrialPool::new(
        (0..config.concurrent_trials)
            .map(|_| TrackTrial::new(arg.track_length, arg.max_steps))
            .collect(),
    );
    let mut scheduler = EpisodeScheduler::new(pool, config.observation_indices.clone());

    eprintln!(
        "Training {} genomes on {} concurrent trials, starting at generation {generation}",
        population.len(),
        config.concurrent_trials,
    );

    let mut best_record = UNEVALUATED_FITNESS;
    scheduler.start_generation(population);

    let (champion, final_snapshot) = loop {
        let Some(done) = scheduler.tick() else {
            continue;
        };

        best_record = best_record.max(done.best_reward);
        eprintln!(
            "Generation #{generation}: best {:.4}, avg {:.4}, all-time best {best_record:.4}",
            done.best_reward, done.average_reward,
        );

        let record = GenerationRecord {
            generation,
            best_reward: done.best_reward,
            average_reward: done.average_reward,
        };
        if let Err(e) = stats.append(&record) {
            warn!("stats append failed: {e}; training continues");
        }

        if generation + 1 - start_generation >= arg.generations {
            // last generation: no further selection, keep the evaluated set
            let champion = done
                .genomes
                .iter()
                .max_by(|a, b| a.fitness().partial_cmp(&b.fitness()).unwrap())
                .map(|g| (g.fitness(), g.export_weights()));
            break (champion, CheckpointSnapshot::capture(generation, &done.genomes));
        }

        let next = selection.advance(&done.genomes, generation, &mut rng);
        generation += 1;

        if let Some(every) = arg.save_every
            && (generation - start_generation) % every == 0
        {
            match store.save(&CheckpointSnapshot::capture(generation, &next)) {
                Ok(path) => info!("checkpoint saved: {}", path.display()),
                Err(e) => error!("checkpoint save failed: {e}; training continues"),
            }
        }

        scheduler.start_generation(next);
    };

    // best-effort save on the way out of the run
    match store.save(&final_snapshot) {
        Ok(path) => eprintln!("Final checkpoint saved: {}", path.display()),
        Err(e) => error!("final checkpoint save failed: {e}"),
    }

    eprintln!("Training complete: all-time best reward {best_record:.4}");
    if let Some((final_fitness, genome)) = champion
        && let Some(path) = &arg.output
    {
        export_champion(path, &config.stage_name, final_fitness, genome)?;
        eprintln!("Champion genome saved to {}", path.display());
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct ChampionExport {
    stage: String,
    trained_at: DateTime<Utc>,
    final_fitness: f32,
    genome: GenomeData,
}

fn export_champion(
    path: &Path,
    stage: &str,
    final_fitness: f32,
    genome: GenomeData,
) -> anyhow::Result<()> {
    let export = ChampionExport {
        stage: stage.to_owned(),
        trained_at: Utc::now(),
        final_fitness,
        genome,
    };
    let file = File::create(path)
        .with_context(|| format!("Failed to create champion file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &export)
        .with_context(|| format!("Failed to write champion file: {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("Failed to flush champion file: {}", path.display()))?;
    Ok(())
}
