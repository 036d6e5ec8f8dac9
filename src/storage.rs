//! Key-value storage for UI preferences.
//!
//! Values are stored as JSON strings under string keys. [`load`] and
//! [`save`] are fire-and-forget: failures are logged, never returned, so
//! a broken preference file can't stop the chart from working.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};

use crate::{ChartError, Result};

/// Key under which the last chart settings are stored.
pub const PREFERENCES_KEY: &str = "chartHistoryPage";

/// String storage keyed by string.
pub trait PreferenceStore {
    /// Returns the raw stored value, if any.
    ///
    /// # Errors
    ///
    /// Returns a [`ChartError`] if the backing storage cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns a [`ChartError`] if the backing storage cannot be written.
    fn set(&mut self, key: &str, value: String) -> Result<()>;

    /// Deletes `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns a [`ChartError`] if the backing storage cannot be written.
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// Reads and parses the value under `key`.
///
/// Missing keys, unreadable storage and unparsable values all yield `None`.
pub fn load<T: DeserializeOwned>(store: &dyn PreferenceStore, key: &str) -> Option<T> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            error!(key, "Error reading preferences: {e}");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            error!(key, "Error parsing preferences data: {e}");
            None
        }
    }
}

/// Serializes `value` and stores it under `key`.
pub fn save<T: Serialize>(store: &mut dyn PreferenceStore, key: &str, value: &T) {
    let raw = match serde_json::to_string(value) {
        Ok(raw) => raw,
        Err(e) => {
            warn!(key, "Preferences could not be serialized: {e}");
            return;
        }
    };

    match store.set(key, raw) {
        Ok(()) => debug!(key, "Saved preferences"),
        Err(e) => warn!(key, "Preferences are not available: {e}"),
    }
}

/// Preferences kept in a JSON file.
///
/// The file holds one object mapping keys to their raw string values. It is
/// read on every access, so several stores may point at the same path.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(ChartError::Io(format!(
                    "failed to read {}: {e}",
                    self.path.display()
                )));
            }
        };

        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        Ok(serde_json::from_str(&content)?)
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                ChartError::Io(format!("failed to create {}: {e}", parent.display()))
            })?;
        }

        let json = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, json)
            .map_err(|e| ChartError::Io(format!("failed to write {}: {e}", self.path.display())))
    }
}

impl PreferenceStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), value);
        self.write_all(&entries)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let mut entries = self.read_all()?;
        if entries.remove(key).is_some() {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}

/// Process-local preferences. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map is still a valid map.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.entries().insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries().remove(key);
        Ok(())
    }
}
