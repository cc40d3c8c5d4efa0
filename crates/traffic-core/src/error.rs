//! Error types for the traffic simulator

use thiserror::Error;

/// Main error type for the traffic simulator
#[derive(Error, Debug)]
pub enum TrafficError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for simulator operations
pub type Result<T> = std::result::Result<T, TrafficError>;
