//! Traffic CLI - Command line interface for the signal control simulator
//!
//! Runs the Q-Learning and fixed-time controllers against the same
//! intersection model and reports queue and throughput metrics.

// Clippy pedantic allows - these are intentional design choices
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::unused_async)]
#![allow(clippy::float_cmp)]

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use traffic_core::util::load_env_file;

mod commands;
mod config;

use commands::{compare, config as config_cmd, run};
use crate::config::Config;

#[derive(Parser)]
#[command(name = "traffic-sim")]
#[command(author, version, about = "Traffic signal control simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one simulation with the chosen policy
    Run(run::RunArgs),

    /// Run both policies and compare them
    Compare(compare::CompareArgs),

    /// Configuration management
    #[command(subcommand)]
    Config(config_cmd::ConfigCommands),
}

fn init_tracing(config: &Config, verbose: bool) {
    let level = if verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("traffic_sim={level},traffic_rl={level},traffic_core={level}").into()
    });

    let registry = tracing_subscriber::registry().with(env_filter);
    if config.logging.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn main() -> Result<()> {
    // Load environment from traffic.env file (before parsing args)
    load_env_file();

    let cli = Cli::parse();
    let config = Config::load()?;

    init_tracing(&config, cli.verbose);

    let runtime = tokio::runtime::Runtime::new()?;
    let outcome = runtime.block_on(execute(cli.command, &config));
    // A timed-out simulation still holds a blocking thread; exit without it
    runtime.shutdown_background();
    outcome
}

async fn execute(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Run(args) => run::run(args, config).await,
        Commands::Compare(args) => compare::run(args, config).await,
        Commands::Config(cmd) => config_cmd::run(cmd, config),
    }
}
