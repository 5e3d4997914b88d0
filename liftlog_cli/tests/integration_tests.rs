//! Integration tests for the liftlog binary.
//!
//! These tests verify end-to-end behavior including:
//! - The start / log / complete session workflow
//! - Readiness gating
//! - Superset sequencing and the rest timer
//! - History persistence and CSV export

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Helper to get the path to the CLI binary
fn cli() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("liftlog"))
}

/// Write a small two-day plan file and return its path
fn write_plan(dir: &Path) -> PathBuf {
    let plan = serde_json::json!({
        "id": "plan-1",
        "name": "Test Plan",
        "days": [
            {
                "day_name": "Push",
                "exercises": [
                    {
                        "exercise_id": "bench-press",
                        "name": "Bench Press",
                        "target_reps": "8-12",
                        "target_rir": 2,
                        "target_sets": 2,
                        "rest_seconds": 90
                    },
                    {
                        "exercise_id": "dips",
                        "name": "Dips",
                        "target_reps": "10-15",
                        "target_rir": 1,
                        "target_sets": 1,
                        "rest_seconds": 60
                    }
                ]
            },
            {
                "day_name": "Supersets",
                "exercises": [
                    {
                        "exercise_id": "curl",
                        "name": "Curl",
                        "target_reps": "10-12",
                        "target_rir": 1,
                        "target_sets": 1,
                        "rest_seconds": 60,
                        "superset_group": "A"
                    },
                    {
                        "exercise_id": "pushdown",
                        "name": "Pushdown",
                        "target_reps": "10-12",
                        "target_rir": 1,
                        "target_sets": 1,
                        "rest_seconds": 60,
                        "superset_group": "A"
                    },
                    {
                        "exercise_id": "lateral-raise",
                        "name": "Lateral Raise",
                        "target_reps": "12-15",
                        "target_rir": 2,
                        "target_sets": 1,
                        "rest_seconds": 45
                    }
                ]
            }
        ]
    });
    let path = dir.join("plan.json");
    std::fs::write(&path, serde_json::to_string_pretty(&plan).unwrap()).unwrap();
    path
}

fn start_session(data_dir: &Path, plan: &Path, day: usize) {
    cli()
        .arg("start")
        .arg("--day")
        .arg(day.to_string())
        .arg("--plan")
        .arg(plan)
        .arg("--skip-readiness")
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success();
}

#[test]
fn test_cli_help() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Workout session tracker"));
}

#[test]
fn test_start_blocked_without_readiness() {
    let temp_dir = setup_test_dir();
    let plan = write_plan(temp_dir.path());

    cli()
        .args(["start", "--day", "0"])
        .arg("--plan")
        .arg(&plan)
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No readiness entry for today"));

    // No session was created
    assert!(!temp_dir.path().join("active_workout.json").exists());
}

#[test]
fn test_readiness_submit_unblocks_start() {
    let temp_dir = setup_test_dir();
    let plan = write_plan(temp_dir.path());

    cli()
        .args([
            "readiness", "submit", "--energy", "4", "--sleep", "4", "--soreness", "3", "--mood",
            "4",
        ])
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Readiness logged"));

    cli()
        .args(["start", "--day", "0"])
        .arg("--plan")
        .arg(&plan)
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Started 'Push'"));

    assert!(temp_dir.path().join("active_workout.json").exists());
}

#[test]
fn test_low_readiness_prints_volume_hint() {
    let temp_dir = setup_test_dir();
    let plan = write_plan(temp_dir.path());

    cli()
        .args([
            "readiness", "submit", "--energy", "1", "--sleep", "2", "--soreness", "2", "--mood",
            "2",
        ])
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success();

    cli()
        .args(["start", "--day", "0"])
        .arg("--plan")
        .arg(&plan)
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("consider reducing volume"));
}

#[test]
fn test_start_twice_is_noop() {
    let temp_dir = setup_test_dir();
    let plan = write_plan(temp_dir.path());
    start_session(temp_dir.path(), &plan, 0);

    cli()
        .args(["start", "--day", "0"])
        .arg("--plan")
        .arg(&plan)
        .arg("--skip-readiness")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("already active"));
}

#[test]
fn test_full_session_workflow() {
    let temp_dir = setup_test_dir();
    let plan = write_plan(temp_dir.path());
    start_session(temp_dir.path(), &plan, 0);

    // Bench press, two sets; first rest is armed
    cli()
        .args([
            "log", "0", "--set", "1", "--weight", "100", "--reps", "10", "--rir", "2",
        ])
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Est. 1RM: 133"))
        .stdout(predicate::str::contains("Rest: 90s"));

    cli()
        .args([
            "log", "0", "--set", "2", "--weight", "100", "--reps", "8", "--rir", "1",
        ])
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success();

    // Final set of the session: no rest armed
    cli()
        .args([
            "log", "1", "--set", "1", "--weight", "0", "--reps", "12", "--rir", "1",
        ])
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("All exercises done"))
        .stdout(predicate::str::contains("Rest:").not());

    cli()
        .args(["complete", "--difficulty", "just_right"])
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Workout complete"));

    // Session cleared, history written
    assert!(!temp_dir.path().join("active_workout.json").exists());
    assert!(temp_dir.path().join("history/workouts.jsonl").exists());
}

#[test]
fn test_superset_day_sequencing() {
    let temp_dir = setup_test_dir();
    let plan = write_plan(temp_dir.path());
    start_session(temp_dir.path(), &plan, 1);

    // Curl -> Pushdown, no rest between partners
    cli()
        .args([
            "log", "0", "--set", "1", "--weight", "15", "--reps", "12", "--rir", "1",
        ])
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("next up [1] Pushdown"))
        .stdout(predicate::str::contains("Rest:").not());

    // Pushdown completes the round: rest arms, no navigation
    cli()
        .args([
            "log", "1", "--set", "1", "--weight", "25", "--reps", "12", "--rir", "1",
        ])
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Rest: 60s"))
        .stdout(predicate::str::contains("next up").not());
}

#[test]
fn test_skip_and_status() {
    let temp_dir = setup_test_dir();
    let plan = write_plan(temp_dir.path());
    start_session(temp_dir.path(), &plan, 0);

    cli()
        .args(["skip", "1", "--reason", "elbow pain"])
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success();

    cli()
        .arg("status")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Push"))
        .stdout(predicate::str::contains("Bench Press (0/2 sets)"))
        .stdout(predicate::str::contains("Dips (skipped)"));
}

#[test]
fn test_cancel_discards_session() {
    let temp_dir = setup_test_dir();
    let plan = write_plan(temp_dir.path());
    start_session(temp_dir.path(), &plan, 0);

    cli()
        .arg("cancel")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing was logged"));

    assert!(!temp_dir.path().join("active_workout.json").exists());
    assert!(!temp_dir.path().join("history/workouts.jsonl").exists());
}

#[test]
fn test_terminal_commands_fail_without_session() {
    let temp_dir = setup_test_dir();

    cli()
        .arg("cancel")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .failure();

    cli()
        .args(["complete", "--difficulty", "too_hard"])
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .failure();
}

#[test]
fn test_weight_pr_reported_on_second_session() {
    let temp_dir = setup_test_dir();
    let plan = write_plan(temp_dir.path());

    // First session sets the baseline
    start_session(temp_dir.path(), &plan, 0);
    for (exercise, set, weight) in [("0", "1", "100"), ("0", "2", "100"), ("1", "1", "20")] {
        cli()
            .args(["log", exercise, "--set", set, "--weight", weight, "--reps", "8"])
            .arg("--data-dir")
            .arg(temp_dir.path())
            .assert()
            .success();
    }
    cli()
        .arg("complete")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success();

    // Second session beats the bench press weight
    start_session(temp_dir.path(), &plan, 0);
    for (exercise, set, weight) in [("0", "1", "105"), ("0", "2", "100"), ("1", "1", "20")] {
        cli()
            .args(["log", exercise, "--set", set, "--weight", weight, "--reps", "8"])
            .arg("--data-dir")
            .arg(temp_dir.path())
            .assert()
            .success();
    }
    cli()
        .arg("complete")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Weight PR - Bench Press: 105.0 (was 100.0)"));

    assert!(temp_dir.path().join("history/records.jsonl").exists());
}

#[test]
fn test_rest_adjust_and_cancel() {
    let temp_dir = setup_test_dir();
    let plan = write_plan(temp_dir.path());
    start_session(temp_dir.path(), &plan, 0);

    cli()
        .args([
            "log", "0", "--set", "1", "--weight", "100", "--reps", "10", "--rir", "2",
        ])
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success();

    cli()
        .args(["rest", "--adjust", "60"])
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Rest remaining"));

    cli()
        .args(["rest", "--cancel"])
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Rest timer cancelled"));

    cli()
        .arg("rest")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No rest timer running"));
}

#[test]
fn test_rpe_conflicts_with_rir() {
    let temp_dir = setup_test_dir();
    let plan = write_plan(temp_dir.path());
    start_session(temp_dir.path(), &plan, 0);

    cli()
        .args([
            "log", "0", "--set", "1", "--weight", "100", "--reps", "10", "--rir", "2", "--rpe",
            "8",
        ])
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .failure();
}

#[test]
fn test_export_csv() {
    let temp_dir = setup_test_dir();
    let plan = write_plan(temp_dir.path());
    start_session(temp_dir.path(), &plan, 0);

    for (exercise, set) in [("0", "1"), ("0", "2"), ("1", "1")] {
        cli()
            .args(["log", exercise, "--set", set, "--weight", "50", "--reps", "10"])
            .arg("--data-dir")
            .arg(temp_dir.path())
            .assert()
            .success();
    }
    cli()
        .arg("complete")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success();

    let out = temp_dir.path().join("sets.csv");
    cli()
        .arg("export-csv")
        .arg("--out")
        .arg(&out)
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 3 set rows"));

    let contents = std::fs::read_to_string(&out).unwrap();
    assert!(contents.contains("Bench Press"));
    assert!(contents.contains("Dips"));
}

#[test]
fn test_invalid_readiness_scores_rejected() {
    let temp_dir = setup_test_dir();

    cli()
        .args([
            "readiness", "submit", "--energy", "9", "--sleep", "3", "--soreness", "3", "--mood",
            "3",
        ])
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .failure();
}

#[test]
fn test_invalid_plan_rejected() {
    let temp_dir = setup_test_dir();
    let plan_path = temp_dir.path().join("bad_plan.json");
    // Superset group with a single member, zero sets
    let plan = serde_json::json!({
        "id": "bad",
        "name": "Bad Plan",
        "days": [{
            "day_name": "Oops",
            "exercises": [{
                "exercise_id": "curl",
                "name": "Curl",
                "target_reps": "10-12",
                "target_rir": 1,
                "target_sets": 0,
                "rest_seconds": 60,
                "superset_group": "A"
            }]
        }]
    });
    std::fs::write(&plan_path, serde_json::to_string(&plan).unwrap()).unwrap();

    cli()
        .args(["start", "--day", "0"])
        .arg("--plan")
        .arg(&plan_path)
        .arg("--skip-readiness")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Plan validation errors"));
}
