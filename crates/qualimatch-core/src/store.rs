//! Key-value string store seam and its adapters.
//!
//! Sessions only ever see [`KvStore`]. Values are JSON strings; reads of
//! corrupted values fall back to a default and log a warning instead of
//! failing the session.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StoreError;

/// Participant id used before the learner enters one.
pub const ANON: &str = "__anon__";

/// Key holding the last entered participant id.
pub const PID_KEY: &str = "qm_pid";

/// Storage keys, all scoped by participant and seed.
pub mod keys {
    use crate::model::Phase;

    pub fn progress(phase: Phase, pid: &str, seed: &str) -> String {
        format!("qm_prog_{phase}_{pid}_{seed}")
    }

    pub fn timer(phase: Phase, pid: &str, seed: &str) -> String {
        format!("qm_timer_{phase}_{pid}_{seed}")
    }

    pub fn last(phase: Phase, pid: &str, seed: &str) -> String {
        format!("qm_last_{phase}_{pid}_{seed}")
    }

    pub fn practice(pid: &str, seed: &str) -> String {
        format!("qm_practice_{pid}_{seed}")
    }

    pub fn build_draft(pid: &str, seed: &str) -> String {
        format!("qm_build_draft_{pid}_{seed}")
    }

    pub fn build_last(pid: &str, seed: &str) -> String {
        format!("qm_build_last_{pid}_{seed}")
    }
}

/// A persistent string store.
pub trait KvStore {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;

    fn delete(&mut self, key: &str) -> Result<(), StoreError>;

    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

/// In-memory store, used by tests and one-shot commands.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Store backed by a single JSON object file, rewritten on every change.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open a store file. A missing file starts empty; an unreadable JSON body
    /// is logged and treated as empty.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => BTreeMap::new(),
            Ok(content) => match serde_json::from_str(&content) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "store file is corrupted, starting empty");
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        tracing::debug!(path = %path.display(), keys = entries.len(), "opened store");
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let body = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(&self.path, body).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        self.flush()
    }

    fn delete(&mut self, key: &str) -> Result<(), StoreError> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

/// Read and decode a JSON value. Absent keys and corrupted values both yield
/// `None`; corruption is logged.
pub fn read_json<T: DeserializeOwned>(store: &dyn KvStore, key: &str) -> Option<T> {
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, error = %e, "ignoring corrupted stored value");
            None
        }
    }
}

/// [`read_json`] with a default for missing or corrupted values.
pub fn read_json_or<T: DeserializeOwned + Default>(store: &dyn KvStore, key: &str) -> T {
    read_json(store, key).unwrap_or_default()
}

/// Encode and store a JSON value.
pub fn write_json<T: Serialize + ?Sized>(
    store: &mut dyn KvStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let encoded = serde_json::to_string(value)?;
    store.set(key, encoded)
}
