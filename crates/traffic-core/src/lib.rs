//! Traffic Core - Shared types for the traffic signal simulator
//!
//! This crate provides the queue model, run records, and error types used
//! by the simulation engine and its front ends.

// Clippy pedantic allows - these are intentional design choices
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::float_cmp)]

pub mod error;
pub mod queue;
pub mod simulation;
pub mod util;

pub use error::{Result, TrafficError};
pub use queue::{Direction, QueueState, MAX_QUEUE, NUM_DIRECTIONS};
pub use simulation::{
    validate_episodes, Algorithm, SimulationResult, SimulationRun, SimulationRunId, StepRecord,
    MAX_EPISODES, MIN_EPISODES, STEPS_PER_EPISODE,
};
