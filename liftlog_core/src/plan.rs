//! Workout plan loading.
//!
//! Plans are produced by an external generator and consumed read-only; this
//! module loads the JSON file it emits and validates the parts the session
//! engine depends on. A missing file just means no plan has been generated
//! yet; a malformed file is an error, since a session cannot start without
//! its prescription.

use crate::{Error, Result, WorkoutDayPrescription, WorkoutPlan};
use std::collections::HashMap;
use std::path::Path;

/// Load a workout plan from a JSON file.
///
/// Returns `None` if the file doesn't exist.
pub fn load_plan(path: &Path) -> Result<Option<WorkoutPlan>> {
    if !path.exists() {
        tracing::debug!("No plan file found at {:?}", path);
        return Ok(None);
    }

    let contents = std::fs::read_to_string(path)?;
    let plan: WorkoutPlan = serde_json::from_str(&contents)
        .map_err(|e| Error::Plan(format!("failed to parse plan file {:?}: {}", path, e)))?;

    tracing::info!(
        "Loaded plan '{}' ({} days) from {:?}",
        plan.name,
        plan.days.len(),
        path
    );

    Ok(Some(plan))
}

/// Parse a target rep range like "8-12" (or a bare "10") into bounds
pub fn parse_rep_range(range: &str) -> Result<(u32, u32)> {
    let parse = |s: &str| {
        s.trim()
            .parse::<u32>()
            .map_err(|_| Error::Plan(format!("invalid rep range '{}'", range)))
    };

    match range.split_once('-') {
        Some((lo, hi)) => {
            let (lo, hi) = (parse(lo)?, parse(hi)?);
            if lo == 0 || lo > hi {
                return Err(Error::Plan(format!("invalid rep range '{}'", range)));
            }
            Ok((lo, hi))
        }
        None => {
            let n = parse(range)?;
            if n == 0 {
                return Err(Error::Plan(format!("invalid rep range '{}'", range)));
            }
            Ok((n, n))
        }
    }
}

impl WorkoutPlan {
    /// Look up a day by index with bounds checking
    pub fn day(&self, day_index: usize) -> Result<&WorkoutDayPrescription> {
        self.days.get(day_index).ok_or_else(|| {
            Error::Plan(format!(
                "day index {} out of bounds (plan '{}' has {} days)",
                day_index,
                self.id,
                self.days.len()
            ))
        })
    }

    /// Validate plan invariants the engine relies on.
    ///
    /// Returns a list of human-readable problems; empty means valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.days.is_empty() {
            errors.push(format!("plan '{}' has no days", self.id));
        }

        for (day_index, day) in self.days.iter().enumerate() {
            if day.exercises.is_empty() {
                errors.push(format!("day {} ('{}') has no exercises", day_index, day.day_name));
            }

            let mut group_sizes: HashMap<&str, usize> = HashMap::new();

            for ex in &day.exercises {
                if ex.target_sets == 0 {
                    errors.push(format!("exercise '{}' prescribes zero sets", ex.name));
                }
                if ex.target_rir > 5 {
                    errors.push(format!(
                        "exercise '{}' has target RIR {} (must be 0-5)",
                        ex.name, ex.target_rir
                    ));
                }
                if let Err(e) = parse_rep_range(&ex.target_reps) {
                    errors.push(format!("exercise '{}': {}", ex.name, e));
                }
                if let Some(group) = ex.superset_group.as_deref() {
                    *group_sizes.entry(group).or_default() += 1;
                }
            }

            for (group, size) in group_sizes {
                if size < 2 {
                    errors.push(format!(
                        "day {} superset group '{}' has a single member",
                        day_index, group
                    ));
                }
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ExercisePrescription;

    fn exercise(name: &str, group: Option<&str>) -> ExercisePrescription {
        ExercisePrescription {
            exercise_id: name.to_lowercase().replace(' ', "-"),
            name: name.into(),
            target_reps: "8-12".into(),
            target_rir: 2,
            target_sets: 3,
            rest_seconds: 120,
            superset_group: group.map(String::from),
        }
    }

    fn plan() -> WorkoutPlan {
        WorkoutPlan {
            id: "plan-1".into(),
            name: "Upper/Lower".into(),
            days: vec![WorkoutDayPrescription {
                day_name: "Upper".into(),
                exercises: vec![exercise("Bench Press", None), exercise("Row", None)],
            }],
        }
    }

    #[test]
    fn test_load_plan_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let plan_path = temp_dir.path().join("plan.json");

        std::fs::write(&plan_path, serde_json::to_string(&plan()).unwrap()).unwrap();

        let loaded = load_plan(&plan_path).unwrap().unwrap();
        assert_eq!(loaded.id, "plan-1");
        assert_eq!(loaded.days[0].exercises.len(), 2);
    }

    #[test]
    fn test_load_missing_plan_returns_none() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(load_plan(&temp_dir.path().join("nope.json"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_load_malformed_plan_is_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let plan_path = temp_dir.path().join("plan.json");
        std::fs::write(&plan_path, "{ not json").unwrap();

        assert!(matches!(load_plan(&plan_path), Err(Error::Plan(_))));
    }

    #[test]
    fn test_parse_rep_range() {
        assert_eq!(parse_rep_range("8-12").unwrap(), (8, 12));
        assert_eq!(parse_rep_range("10").unwrap(), (10, 10));
        assert_eq!(parse_rep_range(" 5 - 8 ").unwrap(), (5, 8));

        assert!(parse_rep_range("12-8").is_err());
        assert!(parse_rep_range("0-5").is_err());
        assert!(parse_rep_range("amrap").is_err());
    }

    #[test]
    fn test_day_lookup_bounds() {
        let p = plan();
        assert!(p.day(0).is_ok());
        assert!(p.day(1).is_err());
    }

    #[test]
    fn test_validate_clean_plan() {
        assert!(plan().validate().is_empty());
    }

    #[test]
    fn test_validate_flags_problems() {
        let mut p = plan();
        p.days[0].exercises[0].target_sets = 0;
        p.days[0].exercises[0].target_rir = 9;
        p.days[0].exercises[1].target_reps = "lots".into();
        p.days[0].exercises[1].superset_group = Some("A".into());

        let errors = p.validate();
        assert_eq!(errors.len(), 4);
    }
}
