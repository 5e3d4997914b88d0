//! Superset navigation rules.
//!
//! Pure functions mapping (prescription grouping, just-logged exercise,
//! completed-set state) to an auto-navigation decision. This reproduces the
//! standard A1 -> B1 -> A2 -> B2 interleaving:
//! - exercises sharing a `superset_group` label form a cycle in
//!   prescription order
//! - after logging a set, focus advances to the next cycle member that
//!   still has incomplete sets
//! - rest is granted once per completed round (when the cycle wraps back to
//!   its first member), never between the halves of a round

use crate::{ActiveExercise, WorkoutDayPrescription};

/// Navigation decision after a set is logged
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SetFollowUp {
    /// Absolute exercise index to focus next, if auto-navigation applies
    pub next_exercise: Option<usize>,
    /// Whether the prescribed rest interval should be armed
    pub arm_rest: bool,
}

impl SetFollowUp {
    /// No navigation, rest armed (the non-superset default)
    pub fn rest_only() -> Self {
        Self {
            next_exercise: None,
            arm_rest: true,
        }
    }
}

/// Decide focus and rest after completing a set of `exercise_index`.
///
/// Exercises without a `superset_group` never auto-navigate and always rest.
/// Within a group, advancing forward through the cycle suppresses rest
/// (minimal rest between superset partners); wrapping back to the first
/// member completes a round and allows rest to arm. Navigation only targets
/// an exercise with at least one incomplete set, so mismatched set counts
/// between partners cannot loop focus into a finished exercise.
pub fn after_set(
    prescription: &WorkoutDayPrescription,
    exercises: &[ActiveExercise],
    exercise_index: usize,
) -> SetFollowUp {
    let Some(group) = prescription
        .exercises
        .get(exercise_index)
        .and_then(|p| p.superset_group.as_deref())
    else {
        return SetFollowUp::rest_only();
    };

    // Cycle members in prescription order
    let cycle: Vec<usize> = prescription
        .exercises
        .iter()
        .enumerate()
        .filter(|(_, p)| p.superset_group.as_deref() == Some(group))
        .map(|(i, _)| i)
        .collect();

    // A single-exercise group behaves like an ungrouped exercise
    if cycle.len() < 2 {
        return SetFollowUp::rest_only();
    }

    let Some(current_pos) = cycle.iter().position(|&i| i == exercise_index) else {
        return SetFollowUp::rest_only();
    };

    let next_pos = (current_pos + 1) % cycle.len();
    let target = cycle[next_pos];
    let wrapped = next_pos == 0;

    let next_exercise = exercises
        .get(target)
        .filter(|e| e.has_incomplete_sets())
        .map(|_| target);

    tracing::debug!(
        group,
        exercise_index,
        ?next_exercise,
        wrapped,
        "superset navigation"
    );

    SetFollowUp {
        next_exercise,
        // Rest only once per full round
        arm_rest: wrapped,
    }
}
