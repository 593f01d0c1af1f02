//! Key-value persistence capability.
//!
//! [`NavigationStateStore`](crate::NavigationStateStore) only needs
//! `get`/`set` of string values under a key. [`FileStore`] keeps all keys in
//! one JSON object file; [`MemoryStore`] is for tests and ephemeral runs.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Error from a [`KeyValueStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The backing file is not a JSON object of strings.
    #[error("Corrupt store {}: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// Value could not be serialized.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// String values under string keys.
pub trait KeyValueStore: Send + Sync {
    /// Value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backing storage cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the value cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate `key`.
    #[must_use]
    pub fn with_entry(self, key: &str, value: &str) -> Self {
        self.lock().insert(key.to_owned(), value.to_owned());
        self
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.lock().insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// Store backed by a JSON object file (`{"key": "value", ...}`).
///
/// Writes replace the file atomically (temporary sibling, then rename).
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    /// Backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut entries = self.read_all().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Replacing unreadable state file");
            BTreeMap::new()
        });
        entries.insert(key.to_owned(), value.to_owned());
        let json = serde_json::to_string_pretty(&entries)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| self.io_error(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))
    }
}
