use std::path::PathBuf;

use anyhow::Context as _;
use clap::Args;
use evodrive_training::CheckpointStore;

#[derive(Debug, Clone, Args)]
pub(crate) struct InspectArg {
    /// Checkpoint file (bare name resolved under the stage's checkpoint directory)
    checkpoint: String,
    #[arg(long, default_value = "LearningData/NE")]
    data_root: PathBuf,
    #[arg(long, default_value = "Stage1")]
    stage: String,
}

pub(crate) fn run(arg: &InspectArg) -> anyhow::Result<()> {
    let store = CheckpointStore::new(
        arg.data_root.clone(),
        arg.stage.clone(),
        "Checkpoints".to_owned(),
        String::new(),
    );
    let snapshot = store
        .load(&arg.checkpoint)
        .context("failed to load checkpoint")?;

    println!("Generation:  {}", snapshot.generation);
    println!("Population:  {}", snapshot.total_population);
    println!("Genomes:     {}", snapshot.genomes.len());
    if let Some(first) = snapshot.genomes.first() {
        let shapes: Vec<String> = first
            .layers
            .iter()
            .map(|layer| {
                let inputs = layer.weights.first().map_or(0, Vec::len);
                format!("{inputs}x{}", layer.weights.len())
            })
            .collect();
        println!("Layers:      {}", shapes.join(" -> "));
    }
    Ok(())
}
