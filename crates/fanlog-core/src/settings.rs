//! Abstract key-value settings collaborator.
//!
//! The logger remembers its global threshold, the native-handler flag, and
//! the remember-session flag across runs through this store. The store is
//! deliberately minimal: string keys to string values, read at
//! `initialize()`, written whenever one of the values changes.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::error::{LogError, LogResult};

/// Keys used by the logger in the settings store.
pub mod keys {
    pub const GLOBAL_LOG_LEVEL: &str = "global_log_level";
    pub const IS_NATIVE_HANDLER: &str = "is_native_handler";
    pub const REMEMBER_SESSION_CONFIG: &str = "remember_session_config";
}

/// Key-value store for logger preferences.
pub trait SettingsStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
}

/// In-memory store; the default for tests and embedded use.
#[derive(Default)]
pub struct MemorySettings {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettings {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.values.lock().insert(key.to_string(), value.to_string());
    }
}

/// JSON-file-backed store with write-through persistence.
pub struct JsonSettings {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl JsonSettings {
    /// Open (or create) a settings file.
    ///
    /// # Errors
    ///
    /// Returns `LogError::Io` when the file exists but cannot be read and
    /// `LogError::Settings` when its contents are not a JSON string map.
    pub fn open(path: impl AsRef<Path>) -> LogResult<Self> {
        let path = path.as_ref().to_path_buf();
        let values = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            serde_json::from_str(&content)
                .map_err(|e| LogError::Settings(format!("invalid settings file: {}", e)))?
        } else {
            BTreeMap::new()
        };
        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, values: &BTreeMap<String, String>) {
        let json = match serde_json::to_string_pretty(values) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(target: "fanlog::settings", "could not serialize settings: {}", e);
                return;
            }
        };
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                let _ = std::fs::create_dir_all(parent);
            }
        }
        if let Err(e) = std::fs::write(&self.path, json) {
            tracing::warn!(target: "fanlog::settings", "could not write settings file: {}", e);
        }
    }
}

impl SettingsStore for JsonSettings {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut values = self.values.lock();
        values.insert(key.to_string(), value.to_string());
        self.persist(&values);
    }
}
