//! Active workout persistence with file locking.
//!
//! The in-progress [`ActiveWorkout`] is saved between CLI invocations so a
//! session survives process restarts. Writes are atomic (temp file, sync,
//! rename) and locked; a corrupt or unreadable state file loads as "no
//! active session" with a warning rather than an error, since a damaged
//! session is not worth blocking the next one over.

use crate::{ActiveWorkout, Error, Result};
use fs2::FileExt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

impl ActiveWorkout {
    /// Load the persisted active workout, if any.
    ///
    /// Returns `None` when no state file exists or it cannot be read or
    /// parsed.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            tracing::debug!("No active workout file at {:?}", path);
            return Ok(None);
        }

        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!(
                    "Unable to open active workout file {:?}: {}. Treating as none.",
                    path,
                    e
                );
                return Ok(None);
            }
        };

        // Shared lock for reading
        if let Err(e) = file.lock_shared() {
            tracing::warn!(
                "Unable to lock active workout file {:?}: {}. Treating as none.",
                path,
                e
            );
            return Ok(None);
        }

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        if let Err(e) = reader.read_to_string(&mut contents) {
            let _ = file.unlock();
            tracing::warn!(
                "Failed to read active workout file {:?}: {}. Treating as none.",
                path,
                e
            );
            return Ok(None);
        }

        file.unlock()?;

        match serde_json::from_str::<ActiveWorkout>(&contents) {
            Ok(workout) => {
                tracing::debug!("Loaded active workout from {:?}", path);
                Ok(Some(workout))
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to parse active workout file {:?}: {}. Treating as none.",
                    path,
                    e
                );
                Ok(None)
            }
        }
    }

    /// Save the active workout atomically:
    /// 1. Write to a temp file in the same directory
    /// 2. Sync to disk
    /// 3. Rename over the original
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let temp = NamedTempFile::new_in(path.parent().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "state path missing parent")
        })?)?;

        // Exclusive lock on the temp file serializes concurrent writers
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(self)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved active workout to {:?}", path);
        Ok(())
    }

    /// Remove the persisted active workout. Idempotent.
    pub fn clear(path: &Path) -> Result<()> {
        match std::fs::remove_file(path) {
            Ok(()) => {
                tracing::debug!("Cleared active workout at {:?}", path);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
