//! CLI command modules

pub mod compare;
pub mod config;
pub mod run;

use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::Serialize;

use traffic_core::SimulationResult;

/// Run blocking simulation work off the async runtime, bounded by `timeout`.
///
/// The timeout only bounds when the error is reported: the worker thread
/// cannot be cancelled and runs to completion unless the runtime is shut
/// down with `shutdown_background`.
pub(crate) async fn run_blocking<T, F>(timeout: Duration, work: F) -> Result<T>
where
    F: FnOnce() -> traffic_core::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let task = tokio::task::spawn_blocking(work);
    let joined = tokio::time::timeout(timeout, task)
        .await
        .map_err(|_| anyhow!("Simulation did not finish within {}s", timeout.as_secs()))?;
    let outcome = joined.context("Simulation task panicked")?;
    Ok(outcome?)
}

/// Write any serializable report as pretty JSON
pub(crate) fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    traffic_core::util::write_json_file(path, value)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Results written to {}", path.display());
    Ok(())
}

pub(crate) fn print_summary(label: &str, result: &SimulationResult) {
    println!("{label}");
    println!("{}", "-".repeat(label.len()));
    println!("  Episodes:        {}", result.episodes);
    println!("  Steps recorded:  {}", result.states.len());
    println!("  Avg wait time:   {:.2}", result.avg_wait_time);
    println!("  Avg throughput:  {:.2}", result.avg_throughput);
    match result.total_reward {
        Some(total) => println!("  Total reward:    {total:.1}"),
        None => println!("  Total reward:    n/a"),
    }
}
