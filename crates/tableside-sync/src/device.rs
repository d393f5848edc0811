//! # Device State
//!
//! The small pieces of state that survive a page reload on a real terminal:
//! the table assignment, the UI language, and the dark-mode preference.
//! Persisted as one JSON file next to the app. Reads tolerate a missing or
//! corrupt file (the device simply starts unconfigured) and write failures
//! are logged but never surfaced, matching how durable per-origin storage
//! behaves in the environment this models.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::model::TableNumber;

fn default_language() -> String {
    "en".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DeviceState {
    table_number: Option<u32>,
    #[serde(default = "default_language")]
    language: String,
    #[serde(default)]
    dark_mode: bool,
}

impl Default for DeviceState {
    fn default() -> Self {
        Self {
            table_number: None,
            language: default_language(),
            dark_mode: false,
        }
    }
}

/// Durable client-local state for one terminal device.
pub struct DeviceStore {
    path: PathBuf,
    state: Mutex<DeviceState>,
}

impl DeviceStore {
    /// Load persisted state from `path`, falling back to a fresh device when
    /// the file is absent or unreadable.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let state = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(state) => state,
                Err(error) => {
                    warn!(path = %path.display(), %error, "Device state unreadable, starting fresh");
                    DeviceState::default()
                }
            },
            Err(_) => DeviceState::default(),
        };
        Self {
            path,
            state: Mutex::new(state),
        }
    }

    pub fn table_number(&self) -> Option<TableNumber> {
        self.state.lock().unwrap().table_number.map(TableNumber)
    }

    pub fn assign_table(&self, table: TableNumber) {
        let mut state = self.state.lock().unwrap();
        state.table_number = Some(table.0);
        info!(%table, "Table assigned to device");
        self.persist(&state);
    }

    /// Forget which table this device belongs to. Language and theme are
    /// kept; a reset device still greets the next guest in the same language.
    pub fn clear_table_assignment(&self) {
        let mut state = self.state.lock().unwrap();
        if state.table_number.take().is_some() {
            info!("Table assignment cleared");
        }
        self.persist(&state);
    }

    pub fn language(&self) -> String {
        self.state.lock().unwrap().language.clone()
    }

    pub fn set_language(&self, language: impl Into<String>) {
        let mut state = self.state.lock().unwrap();
        state.language = language.into();
        self.persist(&state);
    }

    pub fn dark_mode(&self) -> bool {
        self.state.lock().unwrap().dark_mode
    }

    pub fn set_dark_mode(&self, enabled: bool) {
        let mut state = self.state.lock().unwrap();
        state.dark_mode = enabled;
        self.persist(&state);
    }

    fn persist(&self, state: &DeviceState) {
        let serialized = match serde_json::to_string_pretty(state) {
            Ok(serialized) => serialized,
            Err(error) => {
                warn!(%error, "Device state could not be serialized");
                return;
            }
        };
        if let Err(error) = fs::write(&self.path, serialized) {
            warn!(path = %self.path.display(), %error, "Device state could not be written");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("tableside-device-{name}-{}.json", std::process::id()))
    }

    #[test]
    fn starts_fresh_without_a_file() {
        let store = DeviceStore::open(temp_path("fresh"));
        assert_eq!(store.table_number(), None);
        assert_eq!(store.language(), "en");
        assert!(!store.dark_mode());
    }

    #[test]
    fn persists_across_reopen() {
        let path = temp_path("reopen");
        let store = DeviceStore::open(&path);
        store.assign_table(TableNumber(7));
        store.set_language("vi");
        store.set_dark_mode(true);

        let reopened = DeviceStore::open(&path);
        assert_eq!(reopened.table_number(), Some(TableNumber(7)));
        assert_eq!(reopened.language(), "vi");
        assert!(reopened.dark_mode());

        let _ = fs::remove_file(path);
    }

    #[test]
    fn reset_keeps_preferences() {
        let path = temp_path("reset");
        let store = DeviceStore::open(&path);
        store.assign_table(TableNumber(3));
        store.set_language("vi");

        store.clear_table_assignment();
        assert_eq!(store.table_number(), None);
        assert_eq!(store.language(), "vi");

        let _ = fs::remove_file(path);
    }
}
