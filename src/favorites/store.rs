//! Durable key-value slots
//!
//! A tiny client-local store: string keys to string values. The file-backed
//! store keeps every slot in one JSON object and replaces the file atomically
//! on each write.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tempfile::NamedTempFile;

use crate::error::{CatalogError, Result};

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Durably write `value`; returns only after the write is complete
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}

/// JSON-object file store (`{"favorites": "[1,4,25]"}`)
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    path: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_slots(&self, key: &str) -> Result<BTreeMap<String, String>> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw).map_err(|e| CatalogError::MalformedStore {
            slot: key.to_string(),
            reason: format!("{}: {}", self.path.display(), e),
        })
    }

    fn write_slots(&self, slots: &BTreeMap<String, String>) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;

        let body = serde_json::to_string_pretty(slots)
            .map_err(|e| CatalogError::Store(std::io::Error::other(e)))?;

        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(body.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| CatalogError::Store(e.error))?;
        Ok(())
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_slots(key)?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut slots = match self.read_slots(key) {
            Ok(slots) => slots,
            Err(CatalogError::MalformedStore { reason, .. }) => {
                tracing::warn!(
                    path = %self.path.display(),
                    reason = %reason,
                    "Store file unreadable, rewriting from scratch"
                );
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };
        slots.insert(key.to_string(), value.to_string());
        self.write_slots(&slots)
    }
}

/// Process-local store; contents vanish with the process
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    slots: Mutex<BTreeMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with one slot
    pub fn with_slot(key: &str, value: &str) -> Self {
        let store = Self::default();
        if let Ok(mut slots) = store.slots.lock() {
            slots.insert(key.to_string(), value.to_string());
        }
        store
    }
}

fn poisoned() -> CatalogError {
    CatalogError::Store(std::io::Error::other("memory store lock poisoned"))
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let slots = self.slots.lock().map_err(|_| poisoned())?;
        Ok(slots.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut slots = self.slots.lock().map_err(|_| poisoned())?;
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_missing_file_reads_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyValueStore::new(dir.path().join("store.json"));
        assert_eq!(store.get("favorites").unwrap(), None);
    }

    #[test]
    fn test_file_store_round_trip_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");
        let store = FileKeyValueStore::new(&path);

        store.set("favorites", "[25]").unwrap();
        store.set("theme", "dark").unwrap();

        let reopened = FileKeyValueStore::new(&path);
        assert_eq!(reopened.get("favorites").unwrap().as_deref(), Some("[25]"));
        assert_eq!(reopened.get("theme").unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn test_file_store_corrupt_file_is_malformed_then_recoverable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "{not json").unwrap();
        let store = FileKeyValueStore::new(&path);

        assert!(matches!(
            store.get("favorites"),
            Err(CatalogError::MalformedStore { .. })
        ));

        store.set("favorites", "[1]").unwrap();
        assert_eq!(store.get("favorites").unwrap().as_deref(), Some("[1]"));
    }

    #[test]
    fn test_memory_store_shared_through_arc() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let handle: Arc<dyn KeyValueStore> = store.clone();
        handle.set("favorites", "[7]").unwrap();
        assert_eq!(store.get("favorites").unwrap().as_deref(), Some("[7]"));
    }
}
