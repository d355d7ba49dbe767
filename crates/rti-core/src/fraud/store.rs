//! Scoped key-value stores for the persisted device identifier.
//!
//! A store defines the scope in which `Device-ID` stays stable: one
//! in-memory store per process, or one file per installation.
//!
//! # File layout
//!
//! ```text
//! ~/.local/share/rti/state/
//!   device.json      # {"rti.device_id": "..."}
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::error::{RtiError, RtiResult};

/// Small key-value interface injected into the header generator.
pub trait DeviceStore: Send + Sync {
    fn get(&self, key: &str) -> RtiResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> RtiResult<()>;
}

impl<T: DeviceStore + ?Sized> DeviceStore for Arc<T> {
    fn get(&self, key: &str) -> RtiResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> RtiResult<()> {
        (**self).set(key, value)
    }
}

/// Process-scoped store.
#[derive(Debug, Default)]
pub struct MemoryDeviceStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryDeviceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DeviceStore for MemoryDeviceStore {
    fn get(&self, key: &str) -> RtiResult<Option<String>> {
        let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> RtiResult<()> {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store backed by a JSON file, stable across process restarts.
#[derive(Debug)]
pub struct FileDeviceStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileDeviceStore {
    /// Store in the default location.
    ///
    /// Default: `{data_dir}/rti/state/device.json`
    pub fn new() -> RtiResult<Self> {
        Ok(Self::in_dir(default_state_dir()?))
    }

    /// Store as `device.json` inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::with_path(dir.as_ref().join("device.json"))
    }

    /// Store at an explicit file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> RtiResult<BTreeMap<String, String>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(RtiError::Store {
                    message: format!("failed to read {}: {}", self.path.display(), e),
                })
            }
        };

        serde_json::from_str(&content).map_err(|e| RtiError::Store {
            message: format!("corrupt device store {}: {}", self.path.display(), e),
        })
    }

    fn write_all(&self, values: &BTreeMap<String, String>) -> RtiResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| RtiError::Store {
                message: format!("failed to create state directory: {}", e),
            })?;
        }

        let json = serde_json::to_string_pretty(values).map_err(|e| RtiError::Store {
            message: format!("failed to serialize device store: {}", e),
        })?;

        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, json).map_err(|e| RtiError::Store {
            message: format!("failed to write temp file: {}", e),
        })?;
        fs::rename(&temp_path, &self.path).map_err(|e| RtiError::Store {
            message: format!("failed to rename temp file: {}", e),
        })?;

        debug!(path = %self.path.display(), "wrote device store");
        Ok(())
    }
}

impl DeviceStore for FileDeviceStore {
    fn get(&self, key: &str) -> RtiResult<Option<String>> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> RtiResult<()> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut values = self.read_all()?;
        values.insert(key.to_string(), value.to_string());
        self.write_all(&values)
    }
}

/// Default directory for persisted state.
pub fn default_state_dir() -> RtiResult<PathBuf> {
    let base = dirs::data_dir()
        .or_else(dirs::home_dir)
        .ok_or_else(|| RtiError::Store {
            message: "could not determine state directory".to_string(),
        })?;

    Ok(base.join("rti").join("state"))
}
