#![forbid(unsafe_code)]

//! Core domain model and business logic for the Liftlog workout tracker.
//!
//! This crate provides:
//! - Domain types (plans, prescriptions, set logs, workout logs, PRs)
//! - The workout session state machine
//! - Superset navigation and the rest timer
//! - Performance analysis (1RM estimation, PR detection)
//! - Persistence (history JSONL, active-session state, readiness diary)

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod timer;
pub mod superset;
pub mod analysis;
pub mod plan;
pub mod readiness;
pub mod history;
pub mod state;
pub mod session;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use analysis::{detect_personal_records, estimate_one_rep_max};
pub use config::Config;
pub use history::{export_logs_csv, HistorySink, JsonlHistory};
pub use plan::load_plan;
pub use readiness::{ReadinessDiary, REDUCE_VOLUME_THRESHOLD};
pub use session::{
    CompletedSession, ReadinessResolution, SessionEngine, SessionPhase, SessionSnapshot,
    SetOutcome, StartOutcome,
};
pub use timer::{RestTimer, TimerEvent};
