//! Reconnect slots for in-flight jobs.
//!
//! A poller configured with a persist key writes its job id into a slot when it
//! starts and clears the slot when it stops, so a later process can find the
//! job again. Nothing else about the job is stored.

use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use atomicwrites::{AtomicFile, OverwriteBehavior};
use thiserror::Error;

use crate::normalize::JobId;

/// Prefix applied to every slot key
pub const KEY_PREFIX: &str = "job_polling_";

/// Errors from a reconnect store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Atomic write error: {0}")]
    AtomicWrite(String),
}

impl<E: std::fmt::Display> From<atomicwrites::Error<E>> for StoreError {
    fn from(e: atomicwrites::Error<E>) -> Self {
        Self::AtomicWrite(e.to_string())
    }
}

/// Keyed string slots that survive the poller
pub trait ReconnectStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    /// Removing a missing key is not an error
    fn clear(&self, key: &str) -> Result<(), StoreError>;
}

/// Full slot name for a persist key
#[must_use]
pub fn slot_key(persist_key: &str) -> String {
    format!("{KEY_PREFIX}{persist_key}")
}

/// Reads the job id a previous activation left under `persist_key`.
///
/// Read failures and unparsable values are logged and reported as absent.
#[must_use]
pub fn persisted_job_id(store: &dyn ReconnectStore, persist_key: &str) -> Option<JobId> {
    let slot = slot_key(persist_key);
    match store.get(&slot) {
        Ok(value) => value.and_then(|v| v.trim().parse().ok()),
        Err(e) => {
            tracing::warn!(%slot, error = %e, "failed to read reconnect slot");
            None
        }
    }
}

/// In-process store
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReconnectStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(slots.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<(), StoreError> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.remove(key);
        Ok(())
    }
}

/// Store backed by a single JSON object on disk, rewritten atomically
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StoreError> {
        match std::fs::read(&self.path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(BTreeMap::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, slots: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_vec_pretty(slots)?;
        let af = AtomicFile::new(&self.path, OverwriteBehavior::AllowOverwrite);
        af.write(|f| f.write_all(&content))?;
        Ok(())
    }

    fn update(&self, f: impl FnOnce(&mut BTreeMap<String, String>) -> bool) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut slots = self.load()?;
        if f(&mut slots) {
            self.save(&slots)?;
        }
        Ok(())
    }
}

impl ReconnectStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.update(|slots| {
            slots.insert(key.to_string(), value.to_string()).as_deref() != Some(value)
        })
    }

    fn clear(&self, key: &str) -> Result<(), StoreError> {
        self.update(|slots| slots.remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryStore::new();
        store.set(&slot_key("sim"), "42").unwrap();
        assert_eq!(persisted_job_id(&store, "sim"), Some(42));
        store.clear(&slot_key("sim")).unwrap();
        store.clear(&slot_key("sim")).unwrap();
        assert_eq!(persisted_job_id(&store, "sim"), None);
    }

    #[test]
    fn file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("slots.json");

        FileStore::new(&path).set("job_polling_a", "7").unwrap();
        FileStore::new(&path).set("job_polling_b", "8").unwrap();

        let store = FileStore::new(&path);
        assert_eq!(persisted_job_id(&store, "a"), Some(7));
        assert_eq!(persisted_job_id(&store, "b"), Some(8));

        store.clear("job_polling_a").unwrap();
        assert_eq!(FileStore::new(&path).get("job_polling_a").unwrap(), None);
        assert_eq!(FileStore::new(&path).get("job_polling_b").unwrap().as_deref(), Some("8"));
    }

    #[test]
    fn file_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("none.json"));
        assert_eq!(store.get("x").unwrap(), None);
        store.clear("x").unwrap();
        assert!(!store.path().exists());
    }

    #[test]
    fn corrupt_file_reads_as_absent_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slots.json");
        std::fs::write(&path, "{not json").unwrap();
        let store = FileStore::new(&path);
        assert!(matches!(store.get("job_polling_a"), Err(StoreError::Json(_))));
        assert_eq!(persisted_job_id(&store, "a"), None);
    }

    #[test]
    fn non_numeric_slot_is_ignored() {
        let store = MemoryStore::new();
        store.set(&slot_key("k"), "abc").unwrap();
        assert_eq!(persisted_job_id(&store, "k"), None);
    }
}
