//! Core domain types for the Liftlog workout session engine.
//!
//! This module defines the fundamental types used throughout the system:
//! - Workout plans and per-day prescriptions (external, read-only input)
//! - The active in-progress workout and its set logs
//! - Terminal artifacts: workout logs and personal records
//! - Readiness diary entries

use crate::timer::RestTimer;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Prescription Types (produced by an external plan generator)
// ============================================================================

/// Unit a weight was entered in
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeightUnit {
    #[default]
    Kg,
    Lb,
}

/// A single exercise prescription within a workout day
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExercisePrescription {
    pub exercise_id: String,
    pub name: String,
    /// Target rep range as written in the plan, e.g. "8-12"
    pub target_reps: String,
    /// Target reps-in-reserve, 0 (failure) to 5
    pub target_rir: u8,
    /// Number of prescribed working sets
    pub target_sets: u32,
    /// Prescribed rest between sets, in seconds
    pub rest_seconds: u32,
    /// Exercises sharing a group label are performed as a superset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superset_group: Option<String>,
}

/// One day of a workout plan: an ordered list of exercise prescriptions.
///
/// Immutable for the duration of a session.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkoutDayPrescription {
    pub day_name: String,
    pub exercises: Vec<ExercisePrescription>,
}

/// A complete workout plan as emitted by the plan generator
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkoutPlan {
    pub id: String,
    pub name: String,
    pub days: Vec<WorkoutDayPrescription>,
}

// ============================================================================
// Set Logging Types
// ============================================================================

/// Which effort scale the user entered for a set
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum EffortMode {
    #[default]
    Rir,
    Rpe,
}

/// Record of a single set, prescribed or performed.
///
/// `rir` and `rpe` are two views of the same effort scale. When
/// `effort_mode` is [`EffortMode::Rpe`] the `rir` field is derived via
/// [`rir_from_rpe`] and must not be treated as independently authoritative.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SetLog {
    /// 1-based, contiguous within an exercise
    pub set_number: u32,
    pub weight: f64,
    pub weight_unit: WeightUnit,
    pub reps: u32,
    pub rir: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpe: Option<f64>,
    pub effort_mode: EffortMode,
    pub completed: bool,
}

/// Convert an RPE value (6-10 scale) to reps-in-reserve.
///
/// Rounded to the nearest half step and clamped to the 0-5 RIR range.
pub fn rir_from_rpe(rpe: f64) -> f64 {
    (((10.0 - rpe) * 2.0).round() / 2.0).clamp(0.0, 5.0)
}

impl SetLog {
    /// A placeholder set used when building a fresh `ActiveWorkout`
    pub fn pending(set_number: u32, weight: f64, weight_unit: WeightUnit, reps: u32) -> Self {
        Self {
            set_number,
            weight,
            weight_unit,
            reps,
            rir: 0.0,
            rpe: None,
            effort_mode: EffortMode::Rir,
            completed: false,
        }
    }

    /// Reconcile the RIR/RPE dual representation.
    ///
    /// When the set was entered in RPE mode, `rir` is overwritten with the
    /// derived value so downstream consumers can always read `rir`.
    pub fn normalize_effort(&mut self) {
        if self.effort_mode == EffortMode::Rpe {
            if let Some(rpe) = self.rpe {
                self.rir = rir_from_rpe(rpe);
            }
        }
    }

    /// Volume contribution of this set (zero unless completed)
    pub fn volume(&self) -> f64 {
        if self.completed {
            self.weight * self.reps as f64
        } else {
            0.0
        }
    }
}

// ============================================================================
// Active Session Types
// ============================================================================

/// Per-exercise progress within an active workout
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActiveExercise {
    pub exercise_id: String,
    pub sets: Vec<SetLog>,
    pub skipped: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_reason: Option<String>,
}

impl ActiveExercise {
    /// An exercise is complete iff it was skipped or every set is completed
    pub fn is_complete(&self) -> bool {
        self.skipped || self.sets.iter().all(|s| s.completed)
    }

    /// True when at least one set remains to be logged (skipped counts as none)
    pub fn has_incomplete_sets(&self) -> bool {
        !self.skipped && self.sets.iter().any(|s| !s.completed)
    }
}

/// The single in-progress workout session.
///
/// Created by `start_workout`, mutated only through the session engine, and
/// destroyed by either `cancel_workout` (discarded) or `complete_workout`
/// (converted into a [`WorkoutLog`]).
///
/// Invariant: `exercises.len() == prescription.exercises.len()`, and set
/// numbers within each exercise are exactly `1..=n` with no gaps.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActiveWorkout {
    pub plan_id: String,
    pub day_index: usize,
    /// Snapshot of the prescription, immutable for the session
    pub prescription: WorkoutDayPrescription,
    /// Set once at session start, never mutated
    pub started_at: DateTime<Utc>,
    pub exercises: Vec<ActiveExercise>,
    /// Exercise currently in focus, updated by superset auto-navigation
    pub focused_exercise: usize,
    /// Rest countdown; armed only while a rest interval is active
    #[serde(default)]
    pub rest_timer: RestTimer,
}

impl ActiveWorkout {
    /// True when every exercise is either skipped or fully logged
    pub fn is_complete(&self) -> bool {
        self.exercises.iter().all(|e| e.is_complete())
    }

    /// Total volume over all completed sets
    pub fn total_volume(&self) -> f64 {
        self.exercises
            .iter()
            .flat_map(|e| e.sets.iter())
            .map(|s| s.volume())
            .sum()
    }
}

// ============================================================================
// Terminal Artifact Types
// ============================================================================

/// User's overall difficulty rating for a completed session
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PerceivedDifficulty {
    TooEasy,
    JustRight,
    TooHard,
}

/// Per-exercise slice of a finished workout
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExerciseLog {
    pub exercise_id: String,
    pub exercise_name: String,
    pub sets: Vec<SetLog>,
    pub skipped: bool,
}

impl ExerciseLog {
    /// Volume over this exercise's completed sets
    pub fn volume(&self) -> f64 {
        self.sets.iter().map(|s| s.volume()).sum()
    }
}

/// The terminal record of a workout session, immutable once created.
///
/// Created exactly once, at session completion; ownership transfers to
/// history storage.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkoutLog {
    pub id: Uuid,
    pub plan_id: String,
    pub day_name: String,
    pub started_at: DateTime<Utc>,
    pub duration_minutes: i64,
    pub total_volume: f64,
    pub exercises: Vec<ExerciseLog>,
    pub perceived_difficulty: PerceivedDifficulty,
    pub notes: String,
}

/// What kind of best a personal record represents
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Weight,
    Volume,
}

/// A new best for an exercise, derived at workout completion.
///
/// Append-only; never mutated after creation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PersonalRecord {
    pub id: Uuid,
    pub workout_log_id: Uuid,
    pub exercise_name: String,
    pub kind: RecordKind,
    pub previous_value: f64,
    pub new_value: f64,
}

// ============================================================================
// Readiness Types
// ============================================================================

/// A daily readiness diary entry.
///
/// Component scores use a 1-5 scale; `overall_score` is their mean.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReadinessEntry {
    pub date: NaiveDate,
    pub energy: u8,
    pub sleep: u8,
    pub soreness: u8,
    pub mood: u8,
    pub overall_score: f64,
}

impl ReadinessEntry {
    /// Build an entry for `date`, computing the overall score
    pub fn new(date: NaiveDate, energy: u8, sleep: u8, soreness: u8, mood: u8) -> Self {
        let overall_score = (energy + sleep + soreness + mood) as f64 / 4.0;
        Self {
            date,
            energy,
            sleep,
            soreness,
            mood,
            overall_score,
        }
    }
}
