//! Append-only workout history storage.
//!
//! Workout logs and personal records are appended to JSONL (JSON Lines)
//! files with file locking for safe concurrent access. The read side powers
//! the engine's history queries: last performance per exercise (used to
//! pre-seed a new session) and the prior-log corpus handed to PR detection.
//!
//! A CSV export (one row per set) is provided for spreadsheet use.

use crate::{ExerciseLog, PersonalRecord, Result, WorkoutLog};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Sink trait for persisting finished workouts
pub trait HistorySink {
    fn append_log(&mut self, log: &WorkoutLog) -> Result<()>;
    fn append_record(&mut self, record: &PersonalRecord) -> Result<()>;
}

/// JSONL-backed history with file locking.
///
/// Logs and records live in separate append-only files under the same
/// directory.
pub struct JsonlHistory {
    logs_path: PathBuf,
    records_path: PathBuf,
}

impl JsonlHistory {
    /// History rooted at `dir` (conventionally `<data_dir>/history`)
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            logs_path: dir.join("workouts.jsonl"),
            records_path: dir.join("records.jsonl"),
        }
    }

    pub fn logs_path(&self) -> &Path {
        &self.logs_path
    }

    pub fn records_path(&self) -> &Path {
        &self.records_path
    }

    /// Read all workout logs, oldest first as written
    pub fn read_logs(&self) -> Result<Vec<WorkoutLog>> {
        read_jsonl(&self.logs_path)
    }

    /// Read all personal records
    pub fn read_records(&self) -> Result<Vec<PersonalRecord>> {
        read_jsonl(&self.records_path)
    }

    fn ensure_parent_dir(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    fn append_line<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
        Self::ensure_parent_dir(path)?;

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        // Acquire exclusive lock
        file.lock_exclusive()?;

        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(value)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        file.unlock()?;
        Ok(())
    }
}

impl HistorySink for JsonlHistory {
    fn append_log(&mut self, log: &WorkoutLog) -> Result<()> {
        Self::append_line(&self.logs_path, log)?;
        tracing::debug!("Appended workout log {} to history", log.id);
        Ok(())
    }

    fn append_record(&mut self, record: &PersonalRecord) -> Result<()> {
        Self::append_line(&self.records_path, record)?;
        tracing::debug!(
            "Appended {} PR for {} to history",
            match record.kind {
                crate::RecordKind::Weight => "weight",
                crate::RecordKind::Volume => "volume",
            },
            record.exercise_name
        );
        Ok(())
    }
}

/// Read a JSONL file of `T`, skipping unparseable lines with a warning
fn read_jsonl<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    // Shared lock for reading
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut items = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<T>(&line) {
            Ok(item) => items.push(item),
            Err(e) => {
                tracing::warn!("Failed to parse history line {}: {}", line_num + 1, e);
                // Continue reading, don't fail completely
            }
        }
    }

    file.unlock()?;
    Ok(items)
}

/// Find the most recent performance of an exercise across history.
///
/// Only non-skipped exercise logs with at least one completed set count as a
/// performance. Read-only; logs may be in any order.
pub fn last_performance<'a>(logs: &'a [WorkoutLog], exercise_id: &str) -> Option<&'a ExerciseLog> {
    let mut sorted: Vec<&WorkoutLog> = logs.iter().collect();
    sorted.sort_by(|a, b| b.started_at.cmp(&a.started_at));

    sorted.iter().find_map(|log| {
        log.exercises.iter().find(|e| {
            e.exercise_id == exercise_id && !e.skipped && e.sets.iter().any(|s| s.completed)
        })
    })
}

/// CSV row shape for exported history (one row per set)
#[derive(Debug, serde::Serialize)]
struct CsvSetRow<'a> {
    workout_id: String,
    day_name: &'a str,
    started_at: String,
    exercise: &'a str,
    set_number: u32,
    weight: f64,
    unit: &'a str,
    reps: u32,
    rir: f64,
    completed: bool,
}

/// Export workout logs to a CSV file, one row per set
pub fn export_logs_csv(logs: &[WorkoutLog], path: &Path) -> Result<usize> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::WriterBuilder::new().has_headers(true).from_path(path)?;
    let mut rows = 0;

    for log in logs {
        for exercise in &log.exercises {
            for set in &exercise.sets {
                writer.serialize(CsvSetRow {
                    workout_id: log.id.to_string(),
                    day_name: &log.day_name,
                    started_at: log.started_at.to_rfc3339(),
                    exercise: &exercise.exercise_name,
                    set_number: set.set_number,
                    weight: set.weight,
                    unit: match set.weight_unit {
                        crate::WeightUnit::Kg => "kg",
                        crate::WeightUnit::Lb => "lb",
                    },
                    reps: set.reps,
                    rir: set.rir,
                    completed: set.completed,
                })?;
                rows += 1;
            }
        }
    }

    writer.flush()?;
    tracing::info!("Exported {} set rows to {:?}", rows, path);
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PerceivedDifficulty, RecordKind, SetLog, WeightUnit};
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn test_log(exercise_id: &str, days_ago: i64, weight: f64) -> WorkoutLog {
        let mut set = SetLog::pending(1, weight, WeightUnit::Kg, 8);
        set.completed = true;
        WorkoutLog {
            id: Uuid::new_v4(),
            plan_id: "plan-1".into(),
            day_name: "Push".into(),
            started_at: Utc::now() - Duration::days(days_ago),
            duration_minutes: 40,
            total_volume: weight * 8.0,
            exercises: vec![ExerciseLog {
                exercise_id: exercise_id.into(),
                exercise_name: exercise_id.into(),
                sets: vec![set],
                skipped: false,
            }],
            perceived_difficulty: PerceivedDifficulty::JustRight,
            notes: String::new(),
        }
    }

    #[test]
    fn test_append_and_read_logs() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut history = JsonlHistory::new(temp_dir.path().join("history"));

        let log = test_log("bench-press", 1, 100.0);
        let log_id = log.id;
        history.append_log(&log).unwrap();

        let logs = history.read_logs().unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].id, log_id);
    }

    #[test]
    fn test_append_and_read_records() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut history = JsonlHistory::new(temp_dir.path());

        history
            .append_record(&PersonalRecord {
                id: Uuid::new_v4(),
                workout_log_id: Uuid::new_v4(),
                exercise_name: "Squat".into(),
                kind: RecordKind::Weight,
                previous_value: 140.0,
                new_value: 145.0,
            })
            .unwrap();

        let records = history.read_records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].exercise_name, "Squat");
    }

    #[test]
    fn test_read_missing_files_is_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let history = JsonlHistory::new(temp_dir.path().join("nope"));

        assert!(history.read_logs().unwrap().is_empty());
        assert!(history.read_records().unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_lines_are_skipped() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut history = JsonlHistory::new(temp_dir.path());
        history.append_log(&test_log("row", 1, 60.0)).unwrap();

        // Inject a broken line, then a good one
        {
            let mut f = OpenOptions::new()
                .append(true)
                .open(history.logs_path())
                .unwrap();
            writeln!(f, "{{ not json").unwrap();
        }
        history.append_log(&test_log("row", 0, 62.5)).unwrap();

        let logs = history.read_logs().unwrap();
        assert_eq!(logs.len(), 2);
    }

    #[test]
    fn test_last_performance_picks_most_recent() {
        let old = test_log("bench-press", 10, 95.0);
        let newer = test_log("bench-press", 2, 100.0);
        let logs = vec![old, newer];

        let perf = last_performance(&logs, "bench-press").unwrap();
        assert_eq!(perf.sets[0].weight, 100.0);
    }

    #[test]
    fn test_last_performance_ignores_skipped_and_unknown() {
        let mut skipped = test_log("deadlift", 1, 180.0);
        skipped.exercises[0].skipped = true;
        let logs = vec![skipped];

        assert!(last_performance(&logs, "deadlift").is_none());
        assert!(last_performance(&logs, "unknown").is_none());
    }

    #[test]
    fn test_csv_export_row_per_set() {
        let temp_dir = tempfile::tempdir().unwrap();
        let csv_path = temp_dir.path().join("export.csv");

        let logs = vec![test_log("bench-press", 1, 100.0), test_log("squat", 0, 140.0)];
        let rows = export_logs_csv(&logs, &csv_path).unwrap();
        assert_eq!(rows, 2);

        let contents = std::fs::read_to_string(&csv_path).unwrap();
        assert!(contents.contains("bench-press"));
        assert!(contents.contains("squat"));
    }
}
