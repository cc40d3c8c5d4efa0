//! Simulation run types shared between the engine and its consumers

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, TrafficError};
use crate::queue::{Direction, QueueState};

/// Steps simulated in every episode
pub const STEPS_PER_EPISODE: u32 = 20;

/// Smallest episode count a run accepts
pub const MIN_EPISODES: u32 = 1;

/// Largest episode count a run accepts
pub const MAX_EPISODES: u32 = 1000;

/// Reject episode counts outside `[MIN_EPISODES, MAX_EPISODES]`
pub fn validate_episodes(episodes: u32) -> Result<u32> {
    if (MIN_EPISODES..=MAX_EPISODES).contains(&episodes) {
        Ok(episodes)
    } else {
        Err(TrafficError::InvalidArgument(format!(
            "episodes must be in [{MIN_EPISODES}, {MAX_EPISODES}], got {episodes}"
        )))
    }
}

/// Signal control policy selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    /// Tabular Q-Learning controller
    #[serde(rename = "RL")]
    Rl,
    /// Round-robin fixed-time controller
    #[serde(rename = "Fixed")]
    Fixed,
}

impl Algorithm {
    pub fn as_str(self) -> &'static str {
        match self {
            Algorithm::Rl => "RL",
            Algorithm::Fixed => "Fixed",
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = TrafficError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "RL" => Ok(Algorithm::Rl),
            "Fixed" => Ok(Algorithm::Fixed),
            other => Err(TrafficError::InvalidArgument(format!(
                "unknown algorithm '{other}', expected 'RL' or 'Fixed'"
            ))),
        }
    }
}

/// One observation per simulation step.
///
/// Queue values are those after the step was applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRecord {
    pub episode: u32,
    pub step: u32,
    pub north_queue: u32,
    pub south_queue: u32,
    pub east_queue: u32,
    pub west_queue: u32,
    pub action: u8,
    pub reward: f64,
}

impl StepRecord {
    pub fn new(episode: u32, step: u32, state: &QueueState, action: Direction, reward: f64) -> Self {
        Self {
            episode,
            step,
            north_queue: state.north(),
            south_queue: state.south(),
            east_queue: state.east(),
            west_queue: state.west(),
            action: action.index() as u8,
            reward,
        }
    }

    /// Queue snapshot recorded for this step
    pub fn queue_state(&self) -> Result<QueueState> {
        QueueState::try_new(
            self.north_queue,
            self.south_queue,
            self.east_queue,
            self.west_queue,
        )
    }
}

/// Aggregate outcome of a full run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub episodes: u32,
    /// Mean end-of-step average queue length
    pub avg_wait_time: f64,
    /// Mean vehicles served per step
    pub avg_throughput: f64,
    /// Sum of step rewards, RL only
    pub total_reward: Option<f64>,
    /// Flattened Q-table, RL only
    pub q_values: Option<Vec<f64>>,
    pub states: Vec<StepRecord>,
}

/// Simulation run identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SimulationRunId(pub Uuid);

impl SimulationRunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SimulationRunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SimulationRunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named, completed run in the shape handed to an external store
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationRun {
    pub id: SimulationRunId,
    pub name: String,
    pub algorithm: Algorithm,
    pub created_at: DateTime<Utc>,
    pub result: SimulationResult,
}

impl SimulationRun {
    pub fn new(name: impl Into<String>, algorithm: Algorithm, result: SimulationResult) -> Self {
        Self {
            id: SimulationRunId::new(),
            name: name.into(),
            algorithm,
            created_at: Utc::now(),
            result,
        }
    }
}
