//! Persistence backends for `IconSettings`.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::IconSettings;
use crate::error::Result;

/// Persisted get/set of the overlay's icon settings.
///
/// `load` never fails: a missing or unreadable backing store yields
/// defaults (with `loaded == false`, so the overlay repopulates them).
pub trait ConfigStore {
    fn load(&self) -> IconSettings;
    fn save(&mut self, settings: &IconSettings) -> Result<()>;
}

/// Volatile store, for hosts without persistence and for tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryConfigStore {
    settings: IconSettings,
}

impl MemoryConfigStore {
    pub fn new(settings: IconSettings) -> Self {
        Self { settings }
    }
}

impl ConfigStore for MemoryConfigStore {
    fn load(&self) -> IconSettings {
        self.settings.clone()
    }

    fn save(&mut self, settings: &IconSettings) -> Result<()> {
        self.settings = settings.clone();
        Ok(())
    }
}

/// Pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonConfigStore {
    path: PathBuf,
}

impl JsonConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigStore for JsonConfigStore {
    fn load(&self) -> IconSettings {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                debug!(path = %self.path.display(), "no icon settings on disk ({e}), using defaults");
                return IconSettings::default();
            }
        };
        serde_json::from_str::<IconSettings>(&raw).unwrap_or_else(|e| {
            warn!(path = %self.path.display(), "corrupt icon settings ({e}), using defaults");
            IconSettings::default()
        })
    }

    fn save(&mut self, settings: &IconSettings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(settings)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn json_store_round_trips_through_nested_dir() {
        let dir = TempDir::new().unwrap();
        let mut store = JsonConfigStore::new(dir.path().join("voice").join("speaker.json"));

        let settings = IconSettings {
            loaded: true,
            icon_offset_x: -12,
            icon_offset_y: 40,
            icon_scale: 1.25,
        };
        store.save(&settings).unwrap();
        assert_eq!(store.load(), settings);

        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"iconOffsetY\": 40"));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let store = JsonConfigStore::new(dir.path().join("absent.json"));
        assert_eq!(store.load(), IconSettings::default());
    }

    #[test]
    fn corrupt_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("speaker.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(JsonConfigStore::new(path).load(), IconSettings::default());
    }

    #[test]
    fn load_does_not_clamp() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("speaker.json");
        fs::write(&path, r#"{"loaded":true,"iconOffsetX":9000,"iconScale":7.0}"#).unwrap();
        let loaded = JsonConfigStore::new(path).load();
        assert_eq!(loaded.icon_offset_x, 9000);
        assert_eq!(loaded.icon_scale, 7.0);
    }

    #[test]
    fn memory_store_keeps_last_save() {
        let mut store = MemoryConfigStore::default();
        let mut s = store.load();
        s.icon_offset_x = 3;
        store.save(&s).unwrap();
        assert_eq!(store.load().icon_offset_x, 3);
    }
}
