//! Workout session state machine.
//!
//! The engine owns the single process-wide [`ActiveWorkout`] and is the only
//! writer: all mutation goes through `start_workout` / `log_set` /
//! `skip_exercise` / rest-timer commands / `cancel_workout` /
//! `complete_workout`. Readers get immutable snapshots.
//!
//! Lifecycle: Idle -> AwaitingReadiness -> InProgress -> Completed or
//! Cancelled, after which the engine is Idle again. Entering InProgress
//! requires a resolved readiness signal (today's diary entry, or an explicit
//! skip); once resolved for a plan/day pair the gate stays open for the rest
//! of the process lifetime.

use crate::{
    analysis, history, superset, timer::TimerEvent, ActiveExercise, ActiveWorkout, Error,
    PerceivedDifficulty, PersonalRecord, ReadinessEntry, Result, SetLog, WorkoutDayPrescription,
    WorkoutLog, WorkoutPlan,
};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use uuid::Uuid;

/// Callback invoked when a rest interval completes (haptic/audio seam)
pub type RestNotifier = Box<dyn FnMut() + Send>;

/// Observable lifecycle phase of the engine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    AwaitingReadiness,
    InProgress,
}

/// How the caller resolved the readiness gate
#[derive(Clone, Debug)]
pub enum ReadinessResolution {
    /// A diary entry was submitted for today
    Submitted,
    /// The user explicitly declined to log readiness
    Skipped,
}

/// Result of a `start_workout` call
#[derive(Clone, Debug, PartialEq)]
pub enum StartOutcome {
    /// Session started. Carries the readiness score when it was low enough
    /// to warrant a reduce-volume suggestion (display only).
    Started { reduce_volume_hint: Option<f64> },
    /// A session was already active; the call was a no-op
    AlreadyActive,
}

/// Result of logging a set
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SetOutcome {
    /// Exercise index auto-navigated to, if superset sequencing applies
    pub next_exercise: Option<usize>,
    /// Seconds of rest armed, if any
    pub rest_armed: Option<u32>,
    /// True when this set finished the whole session
    pub session_complete: bool,
}

/// Terminal artifacts of a completed session
#[derive(Clone, Debug)]
pub struct CompletedSession {
    pub log: WorkoutLog,
    pub records: Vec<PersonalRecord>,
}

/// Read-only view of one exercise's progress
#[derive(Clone, Debug)]
pub struct ExerciseSnapshot {
    pub exercise_id: String,
    pub name: String,
    pub completed_sets: u32,
    pub total_sets: u32,
    pub skipped: bool,
    pub complete: bool,
}

/// Read-only view of the active session, sampled by presentation layers
#[derive(Clone, Debug)]
pub struct SessionSnapshot {
    pub day_name: String,
    pub started_at: DateTime<Utc>,
    pub elapsed_minutes: i64,
    pub focused_exercise: usize,
    pub rest_remaining_seconds: Option<i64>,
    pub exercises: Vec<ExerciseSnapshot>,
}

/// The single-writer session controller.
#[derive(Default)]
pub struct SessionEngine {
    active: Option<ActiveWorkout>,
    /// Plan/day pairs whose readiness gate was resolved this process
    resolved_gates: HashSet<(String, usize)>,
    /// Plan/day pair currently blocked on readiness, if any
    pending_gate: Option<(String, usize)>,
    notifier: Option<RestNotifier>,
}

impl std::fmt::Debug for SessionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionEngine")
            .field("active", &self.active)
            .field("resolved_gates", &self.resolved_gates)
            .field("pending_gate", &self.pending_gate)
            .finish_non_exhaustive()
    }
}

impl SessionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the rest-completion callback (haptic/audio side effects live
    /// behind this seam)
    pub fn set_rest_notifier(&mut self, notifier: RestNotifier) {
        self.notifier = Some(notifier);
    }

    pub fn phase(&self) -> SessionPhase {
        if self.active.is_some() {
            SessionPhase::InProgress
        } else if self.pending_gate.is_some() {
            SessionPhase::AwaitingReadiness
        } else {
            SessionPhase::Idle
        }
    }

    /// The active workout, if a session is in progress
    pub fn active(&self) -> Option<&ActiveWorkout> {
        self.active.as_ref()
    }

    /// Adopt a previously persisted workout (process restart).
    ///
    /// Replaces any current session; callers are expected to resume only
    /// from Idle.
    pub fn resume(&mut self, workout: ActiveWorkout) {
        if self.active.is_some() {
            tracing::warn!("Resuming over an existing active workout");
        }
        self.pending_gate = None;
        self.active = Some(workout);
    }

    /// Mark the readiness gate resolved for a plan/day pair.
    ///
    /// Irreversible for the process lifetime: the same pair will not gate
    /// again.
    pub fn resolve_readiness(
        &mut self,
        plan_id: &str,
        day_index: usize,
        resolution: ReadinessResolution,
    ) {
        tracing::info!(plan_id, day_index, ?resolution, "readiness gate resolved");
        self.resolved_gates
            .insert((plan_id.to_string(), day_index));
        if self.pending_gate == Some((plan_id.to_string(), day_index)) {
            self.pending_gate = None;
        }
    }

    /// Start a workout from `plan.days[day_index]`.
    ///
    /// Weight and reps are pre-seeded from the most recent historical
    /// performance of each exercise when available. Returns
    /// [`StartOutcome::AlreadyActive`] (a logged no-op, not an error) when a
    /// session already exists, and [`Error::ReadinessPending`] when no
    /// readiness entry exists for today and the gate has not been explicitly
    /// resolved.
    pub fn start_workout(
        &mut self,
        plan: &WorkoutPlan,
        day_index: usize,
        readiness: Option<&ReadinessEntry>,
        prior_logs: &[WorkoutLog],
        now: DateTime<Utc>,
    ) -> Result<StartOutcome> {
        if self.active.is_some() {
            // The UI may legitimately re-invoke start on re-render
            tracing::info!("start_workout ignored: a session is already active");
            return Ok(StartOutcome::AlreadyActive);
        }

        let gate = (plan.id.clone(), day_index);
        let reduce_volume_hint = match readiness {
            Some(entry) => {
                if crate::readiness::suggests_reduced_volume(entry) {
                    Some(entry.overall_score)
                } else {
                    None
                }
            }
            None => {
                if !self.resolved_gates.contains(&gate) {
                    self.pending_gate = Some(gate);
                    tracing::info!("start_workout blocked pending readiness check");
                    return Err(Error::ReadinessPending);
                }
                None
            }
        };

        let prescription = plan.day(day_index)?.clone();
        let exercises = build_exercises(&prescription, prior_logs);

        tracing::info!(
            plan_id = %plan.id,
            day_index,
            day = %prescription.day_name,
            exercises = exercises.len(),
            "workout started"
        );

        self.pending_gate = None;
        self.active = Some(ActiveWorkout {
            plan_id: plan.id.clone(),
            day_index,
            prescription,
            started_at: now,
            exercises,
            focused_exercise: 0,
            rest_timer: Default::default(),
        });

        Ok(StartOutcome::Started { reduce_volume_hint })
    }

    /// Record a performed set, replacing the pending entry with the same
    /// set number and marking it completed.
    ///
    /// Drives superset auto-navigation and conditionally arms the rest
    /// timer. Rest is never armed after the set that completes the session.
    pub fn log_set(
        &mut self,
        exercise_index: usize,
        mut set: SetLog,
        now: DateTime<Utc>,
    ) -> Result<SetOutcome> {
        let workout = self.active.as_mut().ok_or(Error::NoActiveSession)?;

        let len = workout.exercises.len();
        let exercise = workout
            .exercises
            .get_mut(exercise_index)
            .ok_or(Error::InvalidExerciseIndex {
                index: exercise_index,
                len,
            })?;

        let slot = exercise
            .sets
            .iter_mut()
            .find(|s| s.set_number == set.set_number)
            .ok_or(Error::InvalidSetNumber {
                set_number: set.set_number,
            })?;

        set.normalize_effort();
        set.completed = true;
        *slot = set;

        tracing::debug!(
            exercise_index,
            set_number = slot.set_number,
            weight = slot.weight,
            reps = slot.reps,
            "set logged"
        );

        if workout.is_complete() {
            // Final set of the final exercise: no rest, no navigation
            workout.rest_timer.cancel();
            return Ok(SetOutcome {
                next_exercise: None,
                rest_armed: None,
                session_complete: true,
            });
        }

        let follow = superset::after_set(&workout.prescription, &workout.exercises, exercise_index);

        if let Some(next) = follow.next_exercise {
            workout.focused_exercise = next;
        }

        let rest_armed = if follow.arm_rest {
            let seconds = workout.prescription.exercises[exercise_index].rest_seconds;
            if seconds > 0 {
                workout.rest_timer.start(now, seconds);
                Some(seconds)
            } else {
                None
            }
        } else {
            None
        };

        Ok(SetOutcome {
            next_exercise: follow.next_exercise,
            rest_armed,
            session_complete: false,
        })
    }

    /// Mark an exercise skipped. Its sets are left untouched; the engine
    /// does not mandate which exercise to focus next.
    pub fn skip_exercise(&mut self, exercise_index: usize, reason: Option<String>) -> Result<()> {
        let workout = self.active.as_mut().ok_or(Error::NoActiveSession)?;

        let len = workout.exercises.len();
        let exercise = workout
            .exercises
            .get_mut(exercise_index)
            .ok_or(Error::InvalidExerciseIndex {
                index: exercise_index,
                len,
            })?;

        exercise.skipped = true;
        exercise.skip_reason = reason;
        tracing::info!(exercise_index, "exercise skipped");
        Ok(())
    }

    /// Shift the rest deadline by `delta_seconds`. Never errors: with no
    /// active session or no armed timer this reports
    /// [`TimerEvent::Inactive`], and clamping past `now` ends the rest
    /// period (with notification) rather than failing.
    pub fn adjust_rest_timer(&mut self, delta_seconds: i64, now: DateTime<Utc>) -> TimerEvent {
        let Some(workout) = self.active.as_mut() else {
            return TimerEvent::Inactive;
        };
        let event = workout.rest_timer.adjust(now, delta_seconds);
        if event == TimerEvent::Completed {
            self.notify_rest_complete();
        }
        event
    }

    /// Cancel any armed rest timer. Idempotent, never errors.
    pub fn cancel_rest_timer(&mut self) {
        if let Some(workout) = self.active.as_mut() {
            workout.rest_timer.cancel();
        }
    }

    /// Poll the rest timer (call at most every second). Fires the notify
    /// callback once when the deadline is crossed.
    pub fn poll_rest_timer(&mut self, now: DateTime<Utc>) -> TimerEvent {
        let Some(workout) = self.active.as_mut() else {
            return TimerEvent::Inactive;
        };
        let event = workout.rest_timer.poll(now);
        if event == TimerEvent::Completed {
            self.notify_rest_complete();
        }
        event
    }

    /// Discard the active workout without producing a log.
    pub fn cancel_workout(&mut self) -> Result<()> {
        let workout = self.active.take().ok_or(Error::NoActiveSession)?;
        tracing::info!(
            plan_id = %workout.plan_id,
            day = %workout.prescription.day_name,
            "workout cancelled, no log persisted"
        );
        Ok(())
    }

    /// Finish the active workout: aggregate volume and duration, detect
    /// personal records against `prior_logs`, emit the immutable
    /// [`WorkoutLog`], and return the engine to Idle.
    pub fn complete_workout(
        &mut self,
        perceived_difficulty: PerceivedDifficulty,
        notes: String,
        prior_logs: &[WorkoutLog],
        now: DateTime<Utc>,
    ) -> Result<CompletedSession> {
        let workout = self.active.take().ok_or(Error::NoActiveSession)?;

        let duration_minutes =
            ((now - workout.started_at).num_seconds() as f64 / 60.0).round() as i64;
        let total_volume = workout.total_volume();

        let exercises = workout
            .exercises
            .iter()
            .zip(workout.prescription.exercises.iter())
            .map(|(active, prescribed)| crate::ExerciseLog {
                exercise_id: active.exercise_id.clone(),
                exercise_name: prescribed.name.clone(),
                sets: active.sets.clone(),
                skipped: active.skipped,
            })
            .collect();

        let log = WorkoutLog {
            id: Uuid::new_v4(),
            plan_id: workout.plan_id.clone(),
            day_name: workout.prescription.day_name.clone(),
            started_at: workout.started_at,
            duration_minutes,
            total_volume,
            exercises,
            perceived_difficulty,
            notes,
        };

        let records = analysis::detect_personal_records(&log, prior_logs);

        tracing::info!(
            log_id = %log.id,
            duration_minutes,
            total_volume,
            records = records.len(),
            "workout completed"
        );

        Ok(CompletedSession { log, records })
    }

    /// Most recent historical performance of an exercise. Read-only.
    pub fn last_performance<'a>(
        &self,
        prior_logs: &'a [WorkoutLog],
        exercise_id: &str,
    ) -> Option<&'a crate::ExerciseLog> {
        history::last_performance(prior_logs, exercise_id)
    }

    /// Sample a read-only view of the session for display.
    pub fn snapshot(&self, now: DateTime<Utc>) -> Option<SessionSnapshot> {
        let workout = self.active.as_ref()?;

        let exercises = workout
            .exercises
            .iter()
            .zip(workout.prescription.exercises.iter())
            .map(|(active, prescribed)| ExerciseSnapshot {
                exercise_id: active.exercise_id.clone(),
                name: prescribed.name.clone(),
                completed_sets: active.sets.iter().filter(|s| s.completed).count() as u32,
                total_sets: active.sets.len() as u32,
                skipped: active.skipped,
                complete: active.is_complete(),
            })
            .collect();

        Some(SessionSnapshot {
            day_name: workout.prescription.day_name.clone(),
            started_at: workout.started_at,
            elapsed_minutes: (now - workout.started_at).num_minutes(),
            focused_exercise: workout.focused_exercise,
            rest_remaining_seconds: workout.rest_timer.remaining_seconds(now),
            exercises,
        })
    }

    fn notify_rest_complete(&mut self) {
        if let Some(notifier) = self.notifier.as_mut() {
            notifier();
        }
    }
}

/// Build the per-exercise set scaffolding for a new session.
///
/// One pending [`SetLog`] per prescribed set, pre-seeded from the most
/// recent historical performance when available, zeroed otherwise.
fn build_exercises(
    prescription: &WorkoutDayPrescription,
    prior_logs: &[WorkoutLog],
) -> Vec<ActiveExercise> {
    prescription
        .exercises
        .iter()
        .map(|ex| {
            let previous = history::last_performance(prior_logs, &ex.exercise_id);

            let sets = (1..=ex.target_sets)
                .map(|set_number| {
                    let seed = previous.and_then(|perf| {
                        perf.sets
                            .iter()
                            .find(|s| s.completed && s.set_number == set_number)
                            .or_else(|| perf.sets.iter().rev().find(|s| s.completed))
                    });

                    match seed {
                        Some(s) => SetLog::pending(set_number, s.weight, s.weight_unit, s.reps),
                        None => SetLog::pending(set_number, 0.0, Default::default(), 0),
                    }
                })
                .collect();

            ActiveExercise {
                exercise_id: ex.exercise_id.clone(),
                sets,
                skipped: false,
                skip_reason: None,
            }
        })
        .collect()
}
