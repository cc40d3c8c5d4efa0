//! Side-by-side evaluation of the learned and fixed-time controllers

use serde::Serialize;
use tracing::info;

use traffic_core::{validate_episodes, Algorithm, Result, SimulationResult};

use crate::engine::{SimulationConfig, SimulationRunner};

/// Both runs plus how much the learned controller gains over the baseline
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonReport {
    pub rl: SimulationResult,
    pub fixed: SimulationResult,
    /// Positive when RL queues are shorter
    pub wait_time_improvement_pct: f64,
    /// Positive when RL serves more vehicles per step
    pub throughput_improvement_pct: f64,
}

/// Relative change from `baseline` to `candidate` in percent, zero when the
/// baseline is zero
pub fn improvement_pct(baseline: f64, candidate: f64) -> f64 {
    if baseline == 0.0 {
        0.0
    } else {
        (candidate - baseline) / baseline * 100.0
    }
}

/// Run both policies for `episodes` episodes.
///
/// The two runs execute on separate threads; each builds its own runner so
/// nothing mutable is shared between them.
pub fn compare(config: &SimulationConfig, episodes: u32) -> Result<ComparisonReport> {
    validate_episodes(episodes)?;

    let (rl, fixed) = std::thread::scope(|scope| {
        let rl = scope.spawn(|| SimulationRunner::new(Algorithm::Rl, config)?.run(episodes));
        let fixed = SimulationRunner::new(Algorithm::Fixed, config).and_then(|mut r| r.run(episodes));
        let rl = rl
            .join()
            .unwrap_or_else(|panic| std::panic::resume_unwind(panic));
        (rl, fixed)
    });
    let (rl, fixed) = (rl?, fixed?);

    // Lower wait is better, so flip the sign
    let wait_time_improvement_pct = -improvement_pct(fixed.avg_wait_time, rl.avg_wait_time);
    let throughput_improvement_pct = improvement_pct(fixed.avg_throughput, rl.avg_throughput);

    info!(
        episodes,
        wait_time_improvement_pct, throughput_improvement_pct, "Comparison complete"
    );

    Ok(ComparisonReport {
        rl,
        fixed,
        wait_time_improvement_pct,
        throughput_improvement_pct,
    })
}
