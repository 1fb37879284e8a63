//! Small key/value storage for UI preferences.
//!
//! Reads and writes are synchronous against an in-memory cache. The file
//! backend persists the cache when flushed.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Result, StoreError};

/// Keys dropped from storage on logout.
pub const SESSION_KEYS: [&str; 3] = ["accountId", "pin", "phrase"];

pub trait KeyValueStorage {
    fn get(&self, key: &str) -> Option<Value>;

    fn set(&mut self, key: &str, value: Value);

    fn delete(&mut self, key: &str);

    /// Read a string value, treating non-strings as absent.
    fn get_string(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            Value::String(s) if !s.is_empty() => Some(s),
            _ => None,
        }
    }

    /// Drop session keys.
    fn logout(&mut self) {
        for key in SESSION_KEYS {
            self.delete(key);
        }
    }

    /// Persist pending writes.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Storage shared between stores on the UI thread.
pub type SharedStorage = Rc<RefCell<dyn KeyValueStorage>>;

/// Wrap a storage backend for sharing.
pub fn shared<S: KeyValueStorage + 'static>(storage: S) -> SharedStorage {
    Rc::new(RefCell::new(storage))
}

// ============================================================================
// Memory
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    values: BTreeMap<String, Value>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
    }

    fn delete(&mut self, key: &str) {
        self.values.remove(key);
    }
}

// ============================================================================
// File
// ============================================================================

/// JSON-file backed storage.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    cache: MemoryStorage,
    dirty: bool,
}

impl FileStorage {
    /// Open a storage file. A missing file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str::<BTreeMap<String, Value>>(&content).map_err(
                |source| StoreError::InvalidStorage {
                    path: path.clone(),
                    source,
                },
            )?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => {
                return Err(StoreError::Io {
                    operation: "read",
                    path,
                    source,
                });
            }
        };
        debug!(path = %path.display(), keys = values.len(), "opened storage");
        Ok(Self {
            path,
            cache: MemoryStorage { values },
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Option<Value> {
        self.cache.get(key)
    }

    fn set(&mut self, key: &str, value: Value) {
        self.cache.set(key, value);
        self.dirty = true;
    }

    fn delete(&mut self, key: &str) {
        self.cache.delete(key);
        self.dirty = true;
    }

    fn flush(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                operation: "create directory for",
                path: self.path.clone(),
                source,
            })?;
        }
        let content = serde_json::to_string_pretty(&self.cache.values)?;
        fs::write(&self.path, content).map_err(|source| StoreError::Io {
            operation: "write",
            path: self.path.clone(),
            source,
        })?;
        self.dirty = false;
        debug!(path = %self.path.display(), "flushed storage");
        Ok(())
    }
}

impl Drop for FileStorage {
    fn drop(&mut self) {
        if let Err(error) = self.flush() {
            warn!(%error, "storage not persisted");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn memory_logout_drops_session_keys() {
        let mut storage = MemoryStorage::new();
        storage.set("pin", json!("1234"));
        storage.set("phrase", json!("words"));
        storage.set("gateway", json!("http://127.0.0.1:47800"));
        storage.logout();
        assert_eq!(storage.len(), 1);
        assert_eq!(
            storage.get_string("gateway").as_deref(),
            Some("http://127.0.0.1:47800")
        );
    }

    #[test]
    fn get_string_ignores_empty_and_non_strings() {
        let mut storage = MemoryStorage::new();
        storage.set("a", json!(""));
        storage.set("b", json!(5));
        assert_eq!(storage.get_string("a"), None);
        assert_eq!(storage.get_string("b"), None);
        assert_eq!(storage.get_string("missing"), None);
    }

    #[test]
    fn file_storage_persists_on_flush() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        let mut storage = FileStorage::open(&path).unwrap();
        assert!(!storage.is_dirty());
        storage.set("dataPath", json!("/data"));
        assert!(storage.is_dirty());
        storage.flush().unwrap();
        assert!(!storage.is_dirty());

        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(reopened.get_string("dataPath").as_deref(), Some("/data"));
    }

    #[test]
    fn file_storage_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "[1, 2").unwrap();
        let err = FileStorage::open(&path).unwrap_err();
        assert!(matches!(err, StoreError::InvalidStorage { .. }));
    }
}
