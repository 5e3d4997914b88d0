//! Daily readiness diary.
//!
//! Entries are appended to a JSONL file; the session engine asks for
//! today's entry before a workout may start. A low overall score surfaces a
//! reduce-volume hint to the UI, nothing more: the engine never adjusts
//! weights or reps on its own.

use crate::{ReadinessEntry, Result};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Overall score below which the UI shows a reduce-volume suggestion
pub const REDUCE_VOLUME_THRESHOLD: f64 = 2.5;

/// True when an entry's score warrants the reduce-volume hint
pub fn suggests_reduced_volume(entry: &ReadinessEntry) -> bool {
    entry.overall_score < REDUCE_VOLUME_THRESHOLD
}

/// JSONL-backed readiness diary
pub struct ReadinessDiary {
    path: PathBuf,
}

impl ReadinessDiary {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append an entry to the diary
    pub fn append(&mut self, entry: &ReadinessEntry) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.lock_exclusive()?;

        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(entry)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        file.unlock()?;

        tracing::debug!("Logged readiness entry for {}", entry.date);
        Ok(())
    }

    /// Read all diary entries, oldest first
    pub fn read_all(&self) -> Result<Vec<ReadinessEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)?;
        file.lock_shared()?;

        let reader = BufReader::new(&file);
        let mut entries = Vec::new();

        for (line_num, line_result) in reader.lines().enumerate() {
            let line = line_result?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<ReadinessEntry>(&line) {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    tracing::warn!("Failed to parse readiness line {}: {}", line_num + 1, e);
                }
            }
        }

        file.unlock()?;
        Ok(entries)
    }

    /// Today's entry (UTC date of `now`), if one was logged.
    ///
    /// When the day has multiple entries the most recently written wins.
    pub fn today_entry(&self, now: DateTime<Utc>) -> Result<Option<ReadinessEntry>> {
        let today = now.date_naive();
        let entry = self
            .read_all()?
            .into_iter()
            .rev()
            .find(|e| e.date == today);
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn entry(date: NaiveDate, energy: u8) -> ReadinessEntry {
        ReadinessEntry::new(date, energy, 3, 3, 3)
    }

    #[test]
    fn test_append_and_today_entry() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut diary = ReadinessDiary::new(temp_dir.path().join("readiness.jsonl"));

        let now: DateTime<Utc> = "2024-03-02T08:00:00Z".parse().unwrap();
        diary
            .append(&entry(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), 4))
            .unwrap();
        diary.append(&entry(now.date_naive(), 2)).unwrap();

        let today = diary.today_entry(now).unwrap().unwrap();
        assert_eq!(today.energy, 2);
    }

    #[test]
    fn test_no_entry_for_today() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut diary = ReadinessDiary::new(temp_dir.path().join("readiness.jsonl"));

        let now: DateTime<Utc> = "2024-03-02T08:00:00Z".parse().unwrap();
        diary
            .append(&entry(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), 4))
            .unwrap();

        assert!(diary.today_entry(now).unwrap().is_none());
    }

    #[test]
    fn test_latest_entry_wins_within_a_day() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut diary = ReadinessDiary::new(temp_dir.path().join("readiness.jsonl"));

        let now: DateTime<Utc> = "2024-03-02T20:00:00Z".parse().unwrap();
        diary.append(&entry(now.date_naive(), 1)).unwrap();
        diary.append(&entry(now.date_naive(), 5)).unwrap();

        assert_eq!(diary.today_entry(now).unwrap().unwrap().energy, 5);
    }

    #[test]
    fn test_missing_diary_reads_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let diary = ReadinessDiary::new(temp_dir.path().join("nope.jsonl"));
        assert!(diary.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_reduce_volume_threshold() {
        let low = ReadinessEntry::new(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), 1, 2, 2, 2);
        let fine = ReadinessEntry::new(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), 3, 3, 3, 3);

        assert!(suggests_reduced_volume(&low));
        assert!(!suggests_reduced_volume(&fine));
    }
}
