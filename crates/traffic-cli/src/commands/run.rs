//! Single simulation run

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Args;
use tracing::info;

use traffic_core::{Algorithm, SimulationRun};
use traffic_rl::dispatch_with;

use super::{print_summary, run_blocking, write_json};
use crate::config::Config;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Control policy: RL or Fixed
    #[arg(short, long)]
    pub algorithm: String,

    /// Number of episodes (1-1000), defaults to the configured value
    #[arg(short, long)]
    pub episodes: Option<u32>,

    /// Seed for a reproducible run
    #[arg(long)]
    pub seed: Option<u64>,

    /// Name recorded with the run
    #[arg(long)]
    pub name: Option<String>,

    /// Write the full run, including every step, as JSON
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub async fn run(args: RunArgs, config: &Config) -> Result<()> {
    let algorithm: Algorithm = args.algorithm.parse()?;
    let episodes = args.episodes.unwrap_or(config.simulation.episodes);
    let sim_config = config.simulation_config(args.seed);
    let timeout = Duration::from_secs(config.simulation.run_timeout_seconds);

    info!(%algorithm, episodes, seed = sim_config.seed, "Running simulation");

    let selector = args.algorithm.clone();
    let result = run_blocking(timeout, move || dispatch_with(&sim_config, &selector, episodes)).await?;

    let name = args
        .name
        .unwrap_or_else(|| format!("{algorithm} x{episodes}"));
    let run = SimulationRun::new(name, algorithm, result);

    print_summary(&format!("{} ({})", run.name, run.id), &run.result);

    if let Some(path) = &args.output {
        write_json(path, &run)?;
    }

    Ok(())
}
