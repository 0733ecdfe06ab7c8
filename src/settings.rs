use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::StorageError;
use crate::notify::NotificationPermission;
use crate::storage::{read_optional, write_json_atomic};

pub const SETTINGS_FILE: &str = "settings.json";
pub const DEFAULT_TICK_SECONDS: u64 = 15;

/// Tool configuration kept beside the plan snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub tick_seconds: u64,
    pub notifications: NotificationPermission,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tick_seconds: DEFAULT_TICK_SECONDS,
            notifications: NotificationPermission::Default,
        }
    }
}

impl Settings {
    pub fn path_in(data_dir: &Path) -> PathBuf {
        data_dir.join(SETTINGS_FILE)
    }

    pub fn load(data_dir: &Path) -> Settings {
        let path = Self::path_in(data_dir);
        let parsed: Result<Option<Settings>, StorageError> = read_optional(&path).and_then(|raw| match raw {
            Some(raw) => serde_json::from_str(&raw).map(Some).map_err(StorageError::from),
            None => Ok(None),
        });
        match parsed {
            Ok(Some(settings)) => settings,
            Ok(None) => Settings::default(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "unreadable settings, using defaults");
                Settings::default()
            }
        }
    }

    pub fn save(&self, data_dir: &Path) -> Result<(), StorageError> {
        write_json_atomic(&Self::path_in(data_dir), self)
    }
}

/// Settings merged with command-line and environment overrides.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub settings: Settings,
    pub tick: Duration,
}

impl AppConfig {
    pub fn resolve(data_dir: Option<PathBuf>, tick_secs: Option<u64>) -> Self {
        let data_dir = data_dir.unwrap_or_else(crate::storage::default_data_dir);
        let settings = Settings::load(&data_dir);
        let secs = tick_secs.unwrap_or(settings.tick_seconds).max(1);
        Self {
            data_dir,
            settings,
            tick: Duration::from_secs(secs),
        }
    }

    pub fn pid_file(&self) -> PathBuf {
        self.data_dir.join("watch.pid")
    }

    pub fn save_settings(&self) -> Result<(), StorageError> {
        self.settings.save(&self.data_dir)
    }
}
