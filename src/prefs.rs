//! Persisted Preferences
//!
//! A handful of small flags kept across restarts in one JSON file: the last
//! state sync time and a user-chosen RPC endpoint. There is no schema version;
//! unknown or unreadable content falls back to defaults.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;

/// Persisted values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub last_sync_ms: Option<u64>,
    #[serde(default)]
    pub rpc_endpoint: Option<String>,
    #[serde(default)]
    pub flags: BTreeMap<String, String>,
}

/// File-backed [`Preferences`].
#[derive(Debug)]
pub struct PreferenceStore {
    path: PathBuf,
    prefs: Preferences,
}

impl PreferenceStore {
    /// Loads preferences from `path`. A missing file yields defaults; a corrupt
    /// one is logged and also yields defaults.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let prefs = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
                warn!("Ignoring unreadable preferences at {}: {}", path.display(), e);
                Preferences::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No preferences at {}, using defaults", path.display());
                Preferences::default()
            }
            Err(e) => {
                warn!("Could not read preferences at {}: {}", path.display(), e);
                Preferences::default()
            }
        };
        Self { path, prefs }
    }

    /// Writes the whole file.
    pub fn save(&self) -> Result<()> {
        let text = serde_json::to_string_pretty(&self.prefs)?;
        fs::write(&self.path, text)?;
        Ok(())
    }

    pub fn get(&self) -> &Preferences {
        &self.prefs
    }

    pub fn set_last_sync(&mut self, ts_ms: u64) {
        self.prefs.last_sync_ms = Some(ts_ms);
    }

    pub fn set_rpc_endpoint(&mut self, endpoint: Option<String>) {
        self.prefs.rpc_endpoint = endpoint;
    }

    pub fn set_flag(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.prefs.flags.insert(name.into(), value.into());
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
