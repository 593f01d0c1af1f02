//! Mock storage implementation for testing.
//!
//! Provides [`MockStorage`] for unit testing without filesystem access.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::storage::{Storage, StorageEntry, StorageError, StorageErrorKind};

/// Backend identifier for error messages.
const BACKEND: &str = "Mock";

/// Mock storage for testing.
///
/// Stores files in memory. Parent directories of added files are created
/// implicitly; empty directories can be added with [`MockStorage::with_dir`].
///
/// # Example
///
/// ```ignore
/// use std::path::Path;
/// use folio_storage::{MockStorage, Storage};
///
/// let storage = MockStorage::new()
///     .with_file("OVERVIEW.md", "# Overview")
///     .with_file("nodes/README.md", "# Nodes");
///
/// let entries = storage.list(Path::new("")).unwrap();
/// let content = storage.read(Path::new("OVERVIEW.md")).unwrap();
/// ```
#[derive(Debug)]
pub struct MockStorage {
    root: PathBuf,
    files: RwLock<BTreeMap<PathBuf, String>>,
    dirs: RwLock<BTreeSet<PathBuf>>,
    list_errors: RwLock<HashMap<PathBuf, StorageErrorKind>>,
}

impl Default for MockStorage {
    fn default() -> Self {
        Self {
            root: PathBuf::from("mock://"),
            files: RwLock::new(BTreeMap::new()),
            dirs: RwLock::new(BTreeSet::new()),
            list_errors: RwLock::new(HashMap::new()),
        }
    }
}

impl MockStorage {
    /// Create a new empty mock storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the root identifier reported by [`Storage::root`].
    #[must_use]
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Add a file with content, creating its parent directories.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_file(self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        let path: PathBuf = path.into();
        if let Some(parent) = path.parent() {
            self.add_dirs(parent);
        }
        self.files.write().unwrap().insert(path, content.into());
        self
    }

    /// Add a (possibly empty) directory and its parents.
    #[must_use]
    pub fn with_dir(self, path: impl Into<PathBuf>) -> Self {
        self.add_dirs(&path.into());
        self
    }

    /// Make listing `dir` fail with the given error kind.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_list_error(self, dir: impl Into<PathBuf>, kind: StorageErrorKind) -> Self {
        let dir: PathBuf = dir.into();
        self.add_dirs(&dir);
        self.list_errors.write().unwrap().insert(dir, kind);
        self
    }

    /// Replace a file's content after construction.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn set_file(&self, path: impl Into<PathBuf>, content: impl Into<String>) {
        let path: PathBuf = path.into();
        if let Some(parent) = path.parent() {
            self.add_dirs(parent);
        }
        self.files.write().unwrap().insert(path, content.into());
    }

    fn add_dirs(&self, dir: &Path) {
        let mut dirs = self.dirs.write().unwrap();
        for ancestor in dir.ancestors() {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            dirs.insert(ancestor.to_path_buf());
        }
    }

    fn is_dir(&self, dir: &Path) -> bool {
        dir.as_os_str().is_empty() || self.dirs.read().unwrap().contains(dir)
    }
}

impl Storage for MockStorage {
    fn root(&self) -> &Path {
        &self.root
    }

    fn list(&self, dir: &Path) -> Result<Vec<StorageEntry>, StorageError> {
        if let Some(kind) = self.list_errors.read().unwrap().get(dir) {
            return Err(StorageError::new(*kind)
                .with_path(dir)
                .with_backend(BACKEND));
        }
        if !self.is_dir(dir) {
            return Err(StorageError::not_found(dir).with_backend(BACKEND));
        }

        let mut entries = Vec::new();
        for path in self.dirs.read().unwrap().iter() {
            if path.parent() == Some(dir) {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                entries.push(StorageEntry::dir(dir, name));
            }
        }
        for path in self.files.read().unwrap().keys() {
            if path.parent() == Some(dir) {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                entries.push(StorageEntry::file(dir, name));
            }
        }
        entries.retain(|e| !e.name.starts_with('.'));
        Ok(entries)
    }

    fn read(&self, path: &Path) -> Result<String, StorageError> {
        self.files
            .read()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| StorageError::not_found(path).with_backend(BACKEND))
    }
}
