//! Error types for the liftlog_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for liftlog_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Operation requires an active workout session but none exists
    #[error("no active workout session")]
    NoActiveSession,

    /// A workout session is already in progress
    #[error("a workout session is already active")]
    ActiveSessionExists,

    /// Exercise index outside the prescription bounds
    #[error("exercise index {index} out of bounds (prescription has {len} exercises)")]
    InvalidExerciseIndex { index: usize, len: usize },

    /// Set number does not match any prescribed set
    #[error("set number {set_number} does not exist for this exercise")]
    InvalidSetNumber { set_number: u32 },

    /// Session start blocked pending a readiness check resolution
    #[error("readiness check pending: submit today's entry or explicitly skip it")]
    ReadinessPending,

    /// Workout plan loading/validation error
    #[error("Plan error: {0}")]
    Plan(String),

    /// State management error
    #[error("State error: {0}")]
    State(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
