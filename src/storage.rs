use serde::Serialize;
use std::fs::{self, File};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use crate::error::StorageError;
use crate::types::Plan;

/// Well-known key the plan snapshot is stored under.
pub const STORAGE_KEY: &str = "tooth_time_pixel_v4";

/// Resolves the directory holding the snapshot and settings files.
pub fn default_data_dir() -> PathBuf {
    if let Some(dir) = dirs::data_dir() {
        return dir.join("tooth-time");
    }
    dirs::home_dir()
        .map(|home| home.join(".tooth-time"))
        .unwrap_or_else(|| PathBuf::from(".tooth-time"))
}

/// Write `value` as pretty JSON through a temporary file and an atomic rename
/// so a crash never leaves a half-written snapshot behind.
pub(crate) fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let temp = path.with_extension("tmp");
    let mut f = File::create(&temp)?;
    let content = serde_json::to_string_pretty(value)?;
    f.write_all(content.as_bytes())?;
    f.sync_all()?;
    fs::rename(temp, path)?;
    Ok(())
}

/// Reads a file to a string, `None` when it does not exist.
pub(crate) fn read_optional(path: &Path) -> Result<Option<String>, StorageError> {
    let mut file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    Ok(Some(contents))
}

/// The single persisted plan snapshot.
#[derive(Clone, Debug)]
pub struct Storage {
    storage_path: PathBuf,
}

impl Storage {
    pub fn in_dir(data_dir: impl AsRef<Path>) -> Self {
        Self {
            storage_path: data_dir.as_ref().join(format!("{STORAGE_KEY}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.storage_path
    }

    /// Strict read: missing file is `Ok(None)`, anything unusable is an error.
    pub fn read(&self) -> Result<Option<Plan>, StorageError> {
        let Some(contents) = read_optional(&self.storage_path)? else {
            return Ok(None);
        };
        let plan: Plan = serde_json::from_str(&contents)?;
        plan.check_invariants().map_err(StorageError::Invalid)?;
        Ok(Some(plan))
    }

    /// Startup read. Corrupt or missing data falls back to the default plan.
    pub fn load_or_default(&self) -> Plan {
        match self.read() {
            Ok(Some(plan)) => plan,
            Ok(None) => {
                tracing::debug!(path = %self.storage_path.display(), "no snapshot yet, using defaults");
                Plan::default()
            }
            Err(e) => {
                tracing::warn!(path = %self.storage_path.display(), error = %e, "unreadable snapshot, using defaults");
                Plan::default()
            }
        }
    }

    pub fn save(&self, plan: &Plan) -> Result<(), StorageError> {
        write_json_atomic(&self.storage_path, plan)
    }

    /// Remove the snapshot. Already missing is fine.
    pub fn clear(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.storage_path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_snapshot_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::in_dir(dir.path());
        assert!(storage.read().unwrap().is_none());
        assert_eq!(storage.load_or_default(), Plan::default());
    }

    #[test]
    fn saved_plan_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::in_dir(dir.path().join("nested"));
        let mut plan = Plan::default();
        plan.streak = 4;
        plan.dark_mode = true;
        storage.save(&plan).unwrap();
        assert_eq!(storage.read().unwrap(), Some(plan));
        assert!(!storage.path().with_extension("tmp").exists());
    }

    #[test]
    fn corrupt_snapshot_falls_back_silently() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::in_dir(dir.path());
        fs::write(storage.path(), "{ not json").unwrap();
        assert!(matches!(storage.read(), Err(StorageError::Json(_))));
        assert_eq!(storage.load_or_default(), Plan::default());
    }

    #[test]
    fn snapshot_with_wrong_slot_count_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::in_dir(dir.path());
        let mut value = serde_json::to_value(Plan::default()).unwrap();
        value["rinse"]["times"] = serde_json::json!(["10:30"]);
        fs::write(storage.path(), value.to_string()).unwrap();
        assert!(matches!(storage.read(), Err(StorageError::Invalid(_))));
        assert_eq!(storage.load_or_default(), Plan::default());
    }

    #[test]
    fn clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::in_dir(dir.path());
        storage.save(&Plan::default()).unwrap();
        storage.clear().unwrap();
        assert!(!storage.path().exists());
        storage.clear().unwrap();
    }
}
