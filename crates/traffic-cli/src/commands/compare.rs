//! RL versus fixed-time comparison

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Args;

use traffic_rl::compare;

use super::{print_summary, run_blocking, write_json};
use crate::config::Config;

#[derive(Args, Debug)]
pub struct CompareArgs {
    /// Number of episodes per policy (1-1000), defaults to the configured value
    #[arg(short, long)]
    pub episodes: Option<u32>,

    /// Seed shared by both runs
    #[arg(long)]
    pub seed: Option<u64>,

    /// Write the comparison report as JSON
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub async fn run(args: CompareArgs, config: &Config) -> Result<()> {
    let episodes = args.episodes.unwrap_or(config.simulation.episodes);
    let sim_config = config.simulation_config(args.seed);
    let timeout = Duration::from_secs(config.simulation.run_timeout_seconds);

    let report = run_blocking(timeout, move || compare(&sim_config, episodes)).await?;

    print_summary("Q-Learning", &report.rl);
    println!();
    print_summary("Fixed signal", &report.fixed);
    println!();
    println!("Improvement of RL over fixed signal");
    println!("  Wait time:   {:+.1}%", report.wait_time_improvement_pct);
    println!("  Throughput:  {:+.1}%", report.throughput_improvement_pct);

    if let Some(path) = &args.output {
        write_json(path, &report)?;
    }

    Ok(())
}
