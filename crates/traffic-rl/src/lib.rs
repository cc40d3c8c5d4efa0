//! Traffic RL - Signal control for a four-way intersection
//!
//! This crate provides the queue dynamics, reward signal, tabular
//! Q-Learning agent, and the simulation runner that compares a learned
//! controller against a fixed round-robin schedule.

// Clippy pedantic allows - these are intentional design choices
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::float_cmp)]
#![allow(clippy::similar_names)]

pub mod agent;
pub mod comparison;
pub mod dynamics;
pub mod engine;
pub mod q_table;
pub mod reward;
pub mod state;

pub use agent::{AgentConfig, QLearningAgent};
pub use comparison::{compare, ComparisonReport};
pub use dynamics::{DynamicsConfig, StepOutcome, TrafficDynamics};
pub use engine::{dispatch, dispatch_with, Policy, RunPhase, SimulationConfig, SimulationRunner};
pub use q_table::QTable;
pub use reward::{reward, reward_breakdown, RewardBreakdown};
pub use state::{state_index, NUM_ACTIONS, NUM_STATES};
