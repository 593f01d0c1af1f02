//! Filesystem storage implementation.
//!
//! Provides [`FsStorage`] for listing and reading documents from the local
//! filesystem. Symlinks are followed only while they stay inside the storage
//! root, and a directory that resolves to one of its own ancestors is
//! reported as a [`StorageErrorKind::Cycle`] instead of being listed.

use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::storage::{Storage, StorageEntry, StorageError, StorageErrorKind};

/// Backend identifier for error messages.
const BACKEND: &str = "Fs";

/// Filesystem storage implementation.
///
/// # Example
///
/// ```ignore
/// use std::path::{Path, PathBuf};
/// use folio_storage::{FsStorage, Storage};
///
/// let storage = FsStorage::new(PathBuf::from("docs"));
/// let entries = storage.list(Path::new(""))?;
/// ```
pub struct FsStorage {
    /// Root directory for document storage.
    source_dir: PathBuf,
}

impl FsStorage {
    /// Create a new filesystem storage rooted at `source_dir`.
    #[must_use]
    pub fn new(source_dir: PathBuf) -> Self {
        Self { source_dir }
    }

    /// Validate that a path doesn't escape the source directory.
    ///
    /// Rejects paths containing parent directory components (`..`) and
    /// absolute paths.
    fn validate_path(path: &Path) -> Result<(), StorageError> {
        let escapes = path
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)));

        if escapes {
            return Err(StorageError::new(StorageErrorKind::InvalidPath)
                .with_path(path)
                .with_backend(BACKEND));
        }
        Ok(())
    }

    fn canonical(&self, path: &Path) -> Result<PathBuf, StorageError> {
        let full_path = self.source_dir.join(path);
        fs::canonicalize(&full_path)
            .map_err(|e| StorageError::io(e, Some(full_path)).with_backend(BACKEND))
    }

    /// Fail if `dir` resolves to the same real directory as one of its
    /// logical ancestors.
    fn check_cycle(&self, dir: &Path, resolved: &Path) -> Result<(), StorageError> {
        for ancestor in dir.ancestors().skip(1) {
            let Ok(ancestor_resolved) = self.canonical(ancestor) else {
                continue;
            };
            if ancestor_resolved == resolved {
                return Err(StorageError::new(StorageErrorKind::Cycle)
                    .with_path(dir)
                    .with_backend(BACKEND));
            }
        }
        Ok(())
    }

    /// Classify a symlink target as directory or file. Returns `None` if it
    /// is dangling or points outside the source directory.
    fn resolve_symlink(full_path: &Path, canonical_root: &Path) -> Option<bool> {
        let target = fs::canonicalize(full_path).ok()?;
        if target.starts_with(canonical_root) {
            Some(target.is_dir())
        } else {
            tracing::debug!(
                path = %full_path.display(),
                target = %target.display(),
                "Skipping symlink pointing outside the source directory"
            );
            None
        }
    }
}

impl Storage for FsStorage {
    fn root(&self) -> &Path {
        &self.source_dir
    }

    fn list(&self, dir: &Path) -> Result<Vec<StorageEntry>, StorageError> {
        Self::validate_path(dir)?;
        let canonical_root = self.canonical(Path::new(""))?;
        let resolved = self.canonical(dir)?;
        self.check_cycle(dir, &resolved)?;

        let full_path = self.source_dir.join(dir);
        let read_dir = fs::read_dir(&full_path)
            .map_err(|e| StorageError::io(e, Some(full_path.clone())).with_backend(BACKEND))?;

        let mut entries = Vec::new();
        for entry in read_dir {
            let entry = entry
                .map_err(|e| StorageError::io(e, Some(full_path.clone())).with_backend(BACKEND))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                continue;
            }

            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            let is_dir = if file_type.is_symlink() {
                match Self::resolve_symlink(&entry.path(), &canonical_root) {
                    Some(is_dir) => is_dir,
                    None => continue,
                }
            } else {
                file_type.is_dir()
            };

            entries.push(StorageEntry {
                path: dir.join(&name),
                name,
                is_dir,
            });
        }

        Ok(entries)
    }

    fn read(&self, path: &Path) -> Result<String, StorageError> {
        Self::validate_path(path)?;
        let canonical_root = self.canonical(Path::new(""))?;
        let resolved = self.canonical(path)?;
        if !resolved.starts_with(&canonical_root) {
            tracing::debug!(
                path = %path.display(),
                target = %resolved.display(),
                "Refusing to read through symlink pointing outside the source directory"
            );
            return Err(StorageError::new(StorageErrorKind::InvalidPath)
                .with_path(path)
                .with_backend(BACKEND));
        }
        fs::read_to_string(&resolved)
            .map_err(|e| StorageError::io(e, Some(resolved.clone())).with_backend(BACKEND))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_fs_storage_is_send_sync() {
        assert_send_sync::<FsStorage>();
    }

    fn create_test_dir() -> tempfile::TempDir {
        tempfile::tempdir().unwrap()
    }

    fn names(mut entries: Vec<StorageEntry>) -> Vec<(String, bool)> {
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries.into_iter().map(|e| (e.name, e.is_dir)).collect()
    }

    #[test]
    fn test_list_empty_dir() {
        let temp_dir = create_test_dir();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());
        let entries = storage.list(Path::new("")).unwrap();

        assert!(entries.is_empty());
    }

    #[test]
    fn test_list_missing_dir() {
        let storage = FsStorage::new(PathBuf::from("/nonexistent"));
        let err = storage.list(Path::new("")).unwrap_err();

        assert_eq!(err.kind(), &StorageErrorKind::NotFound);
    }

    #[test]
    fn test_list_files_and_dirs() {
        let temp_dir = create_test_dir();
        fs::write(temp_dir.path().join("OVERVIEW.md"), "# Overview").unwrap();
        fs::create_dir(temp_dir.path().join("nodes")).unwrap();
        fs::write(temp_dir.path().join("nodes/README.md"), "# Nodes").unwrap();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());

        let root = storage.list(Path::new("")).unwrap();
        assert_eq!(
            names(root),
            vec![("OVERVIEW.md".to_owned(), false), ("nodes".to_owned(), true)]
        );

        let nested = storage.list(Path::new("nodes")).unwrap();
        assert_eq!(nested.len(), 1);
        assert_eq!(nested[0].path, PathBuf::from("nodes/README.md"));
    }

    #[test]
    fn test_list_skips_hidden_entries() {
        let temp_dir = create_test_dir();
        fs::write(temp_dir.path().join(".hidden.md"), "# Hidden").unwrap();
        fs::create_dir(temp_dir.path().join(".git")).unwrap();
        fs::write(temp_dir.path().join("visible.md"), "# Visible").unwrap();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());
        let entries = storage.list(Path::new("")).unwrap();

        assert_eq!(names(entries), vec![("visible.md".to_owned(), false)]);
    }

    #[test]
    fn test_list_rejects_path_traversal() {
        let temp_dir = create_test_dir();
        let storage = FsStorage::new(temp_dir.path().to_path_buf());

        let err = storage.list(Path::new("../")).unwrap_err();
        assert_eq!(err.kind(), &StorageErrorKind::InvalidPath);
    }

    #[cfg(unix)]
    #[test]
    fn test_list_follows_symlink_inside_root() {
        let temp_dir = create_test_dir();
        fs::create_dir(temp_dir.path().join("real")).unwrap();
        fs::write(temp_dir.path().join("real/doc.md"), "# Doc").unwrap();
        std::os::unix::fs::symlink(temp_dir.path().join("real"), temp_dir.path().join("alias"))
            .unwrap();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());
        let entries = storage.list(Path::new("")).unwrap();

        assert_eq!(
            names(entries),
            vec![("alias".to_owned(), true), ("real".to_owned(), true)]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_list_skips_symlink_outside_root() {
        let outside = create_test_dir();
        let temp_dir = create_test_dir();
        fs::write(temp_dir.path().join("doc.md"), "# Doc").unwrap();
        std::os::unix::fs::symlink(outside.path(), temp_dir.path().join("escape")).unwrap();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());
        let entries = storage.list(Path::new("")).unwrap();

        assert_eq!(names(entries), vec![("doc.md".to_owned(), false)]);
    }

    #[cfg(unix)]
    #[test]
    fn test_list_detects_symlink_cycle() {
        let temp_dir = create_test_dir();
        fs::create_dir(temp_dir.path().join("a")).unwrap();
        std::os::unix::fs::symlink(temp_dir.path().join("a"), temp_dir.path().join("a/loop"))
            .unwrap();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());

        let entries = storage.list(Path::new("a")).unwrap();
        assert_eq!(names(entries), vec![("loop".to_owned(), true)]);

        let err = storage.list(Path::new("a/loop")).unwrap_err();
        assert_eq!(err.kind(), &StorageErrorKind::Cycle);
    }

    #[test]
    fn test_read_existing_file() {
        let temp_dir = create_test_dir();
        fs::write(temp_dir.path().join("test.md"), "# Hello\n\nWorld").unwrap();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());
        let content = storage.read(Path::new("test.md")).unwrap();

        assert_eq!(content, "# Hello\n\nWorld");
    }

    #[test]
    fn test_read_missing_file() {
        let temp_dir = create_test_dir();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());
        let err = storage.read(Path::new("missing.md")).unwrap_err();

        assert_eq!(err.kind(), &StorageErrorKind::NotFound);
        assert_eq!(err.backend, Some("Fs"));
    }

    #[test]
    fn test_read_rejects_path_traversal() {
        let temp_dir = create_test_dir();
        let storage = FsStorage::new(temp_dir.path().to_path_buf());

        let err = storage.read(Path::new("nodes/../../etc/passwd")).unwrap_err();
        assert_eq!(err.kind(), &StorageErrorKind::InvalidPath);
    }

    #[cfg(unix)]
    #[test]
    fn test_file_symlink_outside_root_is_neither_listed_nor_read() {
        let outside = create_test_dir();
        fs::write(outside.path().join("secret.txt"), "TOP SECRET").unwrap();
        let temp_dir = create_test_dir();
        fs::write(temp_dir.path().join("doc.md"), "# Doc").unwrap();
        std::os::unix::fs::symlink(
            outside.path().join("secret.txt"),
            temp_dir.path().join("leak.md"),
        )
        .unwrap();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());

        let entries = storage.list(Path::new("")).unwrap();
        assert_eq!(names(entries), vec![("doc.md".to_owned(), false)]);
        let err = storage.read(Path::new("leak.md")).unwrap_err();
        assert_eq!(err.kind(), &StorageErrorKind::InvalidPath);
    }

    #[cfg(unix)]
    #[test]
    fn test_file_symlink_inside_root_is_listed_and_read() {
        let temp_dir = create_test_dir();
        fs::write(temp_dir.path().join("doc.md"), "# Doc").unwrap();
        std::os::unix::fs::symlink(temp_dir.path().join("doc.md"), temp_dir.path().join("alias.md"))
            .unwrap();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());

        let entries = storage.list(Path::new("")).unwrap();
        assert_eq!(
            names(entries),
            vec![("alias.md".to_owned(), false), ("doc.md".to_owned(), false)]
        );
        assert_eq!(storage.read(Path::new("alias.md")).unwrap(), "# Doc");
    }
}
