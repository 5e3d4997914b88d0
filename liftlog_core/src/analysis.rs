//! Performance analysis: one-rep-max estimation and PR detection.
//!
//! PR detection runs once per session, at workout completion, comparing the
//! finished log against all prior history:
//! - weight PR: heaviest completed set (at one rep or more) beats the
//!   heaviest ever logged for that exercise
//! - volume PR: this session's per-exercise volume beats the best single
//!   session volume on record
//!
//! Ties are not records, and an exercise with no prior history sets a
//! baseline rather than a record. Each exercise can yield at most one PR of
//! each kind per session.

use crate::{PersonalRecord, RecordKind, WorkoutLog};
use std::collections::HashMap;
use uuid::Uuid;

/// Estimate a one-rep max from a submaximal set using the Epley formula:
/// `weight * (1 + reps / 30)`, rounded to the nearest integer.
///
/// Returns `None` unless `weight > 0` and `reps > 0`; informational display
/// only.
pub fn estimate_one_rep_max(weight: f64, reps: u32) -> Option<u32> {
    if weight <= 0.0 || reps == 0 {
        return None;
    }
    let estimate = weight * (1.0 + reps as f64 / 30.0);
    Some(estimate.round() as u32)
}

/// Historical bests for a single exercise
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct ExerciseBests {
    max_weight: Option<f64>,
    max_session_volume: Option<f64>,
}

/// Fold prior logs into per-exercise bests, keyed by exercise name
fn historical_bests(prior: &[WorkoutLog]) -> HashMap<String, ExerciseBests> {
    let mut bests: HashMap<String, ExerciseBests> = HashMap::new();

    for log in prior {
        for exercise in &log.exercises {
            let entry = bests.entry(exercise.exercise_name.clone()).or_default();

            for set in exercise.sets.iter().filter(|s| s.completed && s.reps >= 1) {
                if entry.max_weight.map_or(true, |w| set.weight > w) {
                    entry.max_weight = Some(set.weight);
                }
            }

            let volume = exercise.volume();
            if volume > 0.0 && entry.max_session_volume.map_or(true, |v| volume > v) {
                entry.max_session_volume = Some(volume);
            }
        }
    }

    bests
}

/// Detect personal records in `log` against all `prior` history.
///
/// A record is emitted only when the new value strictly exceeds the previous
/// best; exercises absent from history produce no records.
pub fn detect_personal_records(log: &WorkoutLog, prior: &[WorkoutLog]) -> Vec<PersonalRecord> {
    let bests = historical_bests(prior);
    let mut records = Vec::new();

    for exercise in &log.exercises {
        let Some(best) = bests.get(&exercise.exercise_name) else {
            // First time performing this exercise: baseline, not a record
            continue;
        };

        let session_max_weight = exercise
            .sets
            .iter()
            .filter(|s| s.completed && s.reps >= 1)
            .map(|s| s.weight)
            .fold(None::<f64>, |acc, w| match acc {
                Some(m) if m >= w => Some(m),
                _ => Some(w),
            });

        if let (Some(new), Some(previous)) = (session_max_weight, best.max_weight) {
            if new > previous {
                tracing::info!(
                    exercise = %exercise.exercise_name,
                    previous,
                    new,
                    "weight PR"
                );
                records.push(PersonalRecord {
                    id: Uuid::new_v4(),
                    workout_log_id: log.id,
                    exercise_name: exercise.exercise_name.clone(),
                    kind: RecordKind::Weight,
                    previous_value: previous,
                    new_value: new,
                });
            }
        }

        let session_volume = exercise.volume();
        if let Some(previous) = best.max_session_volume {
            if session_volume > previous {
                tracing::info!(
                    exercise = %exercise.exercise_name,
                    previous,
                    new = session_volume,
                    "volume PR"
                );
                records.push(PersonalRecord {
                    id: Uuid::new_v4(),
                    workout_log_id: log.id,
                    exercise_name: exercise.exercise_name.clone(),
                    kind: RecordKind::Volume,
                    previous_value: previous,
                    new_value: session_volume,
                });
            }
        }
    }

    records
}
