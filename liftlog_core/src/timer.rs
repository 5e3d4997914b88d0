//! Rest timer with absolute end-time anchoring.
//!
//! The timer stores an absolute deadline rather than a remaining-duration
//! counter, so remaining time is always `end_time - now` recomputed on each
//! poll. A host process that gets suspended and resumed sees the correct
//! remaining time instead of a drifted countdown.
//!
//! The timer never errors: out-of-range adjustments self-clamp, and
//! cancellation is idempotent. Completion is detected by the caller polling
//! `poll(now)` at an interval of one second or less.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of a timer mutation, telling the caller whether the rest period
/// ended as a direct result of the call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerEvent {
    /// Timer is (still) running
    Running,
    /// Timer is not armed
    Inactive,
    /// The rest period just ended; completion should be notified
    Completed,
}

/// A single countdown anchored to an absolute deadline.
///
/// Either inactive (`end_time = None`) or active with a deadline.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RestTimer {
    end_time: Option<DateTime<Utc>>,
}

impl RestTimer {
    /// A timer armed to expire `seconds` from `now`
    pub fn started(now: DateTime<Utc>, seconds: u32) -> Self {
        Self {
            end_time: Some(now + Duration::seconds(i64::from(seconds))),
        }
    }

    /// Restore a timer from a persisted deadline
    pub fn from_end_time(end_time: Option<DateTime<Utc>>) -> Self {
        Self { end_time }
    }

    pub fn is_active(&self) -> bool {
        self.end_time.is_some()
    }

    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.end_time
    }

    /// Arm the timer for `seconds` from `now`, overwriting any existing
    /// deadline (no stacking).
    pub fn start(&mut self, now: DateTime<Utc>, seconds: u32) {
        let end = now + Duration::seconds(i64::from(seconds));
        if self.end_time.is_some() {
            tracing::debug!("Rest timer restarted, new deadline {}", end);
        }
        self.end_time = Some(end);
    }

    /// Shift the deadline by `delta_seconds` (may be negative).
    ///
    /// The result is clamped so the deadline is never in the past: if the
    /// adjusted deadline is at or before `now` the timer cancels itself and
    /// reports [`TimerEvent::Completed`] so the caller can notify
    /// immediately. Adjusting an inactive timer is a no-op.
    pub fn adjust(&mut self, now: DateTime<Utc>, delta_seconds: i64) -> TimerEvent {
        let Some(end) = self.end_time else {
            return TimerEvent::Inactive;
        };

        let adjusted = end + Duration::seconds(delta_seconds);
        if adjusted <= now {
            tracing::debug!("Rest timer adjusted below zero remaining, ending rest");
            self.end_time = None;
            return TimerEvent::Completed;
        }

        self.end_time = Some(adjusted);
        TimerEvent::Running
    }

    /// Clear the deadline. Idempotent: cancelling an inactive timer does
    /// nothing.
    pub fn cancel(&mut self) {
        if self.end_time.take().is_some() {
            tracing::debug!("Rest timer cancelled");
        }
    }

    /// Whole seconds until the deadline, or `None` when inactive.
    ///
    /// Never negative; an expired-but-unpolled timer reads as zero.
    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> Option<i64> {
        self.end_time
            .map(|end| (end - now).num_seconds().max(0))
    }

    /// Check for expiry. On crossing the deadline the timer auto-cancels and
    /// reports [`TimerEvent::Completed`] exactly once; later polls report
    /// [`TimerEvent::Inactive`].
    pub fn poll(&mut self, now: DateTime<Utc>) -> TimerEvent {
        match self.end_time {
            None => TimerEvent::Inactive,
            Some(end) if now >= end => {
                self.end_time = None;
                tracing::debug!("Rest timer expired");
                TimerEvent::Completed
            }
            Some(_) => TimerEvent::Running,
        }
    }
}
