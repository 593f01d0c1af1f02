//! Storage trait and error types.
//!
//! Provides the core [`Storage`] trait for listing directories and reading
//! documents, along with [`StorageError`] for unified error handling across
//! backends.
//!
//! # Path Convention
//!
//! All path parameters are **relative to the storage root**:
//! - `""` - the root directory itself
//! - `"OVERVIEW.md"` - a document at the root
//! - `"nodes"` - a subdirectory
//! - `"nodes/README.md"` - a nested document

use std::path::{Path, PathBuf};

/// A single child of a listed directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageEntry {
    /// File or directory name (last path component).
    pub name: String,
    /// Path relative to the storage root.
    pub path: PathBuf,
    /// True if the entry is a directory (or a symlink to one inside the root).
    pub is_dir: bool,
}

impl StorageEntry {
    /// Create a file entry under `parent`.
    #[must_use]
    pub fn file(parent: &Path, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            path: parent.join(&name),
            name,
            is_dir: false,
        }
    }

    /// Create a directory entry under `parent`.
    #[must_use]
    pub fn dir(parent: &Path, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            path: parent.join(&name),
            name,
            is_dir: true,
        }
    }
}

/// Semantic error categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum StorageErrorKind {
    /// Resource does not exist.
    NotFound,
    /// Permission denied.
    PermissionDenied,
    /// Invalid path (e.g. escapes the storage root).
    InvalidPath,
    /// Directory is reachable from itself through a symlink.
    Cycle,
    /// Operation timed out.
    Timeout,
    /// Other/unknown error category.
    Other,
}

/// Retry guidance.
#[derive(Debug, PartialEq, Eq, Default)]
pub enum ErrorStatus {
    /// Don't retry (not found, invalid path, cycle).
    #[default]
    Permanent,
    /// Retry immediately (timeout, interrupted read).
    Temporary,
}

/// Storage error with semantic kind and backend-specific source.
#[derive(Debug)]
pub struct StorageError {
    /// Semantic error category.
    pub kind: StorageErrorKind,
    /// Retry guidance.
    pub status: ErrorStatus,
    /// Path context (if applicable).
    pub path: Option<PathBuf>,
    /// Backend identifier (e.g., "Fs", "Mock").
    pub backend: Option<&'static str>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl StorageError {
    /// Create a new storage error.
    #[must_use]
    pub fn new(kind: StorageErrorKind) -> Self {
        Self {
            kind,
            status: ErrorStatus::Permanent,
            path: None,
            backend: None,
            source: None,
        }
    }

    /// Attach path context.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Attach backend identifier.
    #[must_use]
    pub fn with_backend(mut self, backend: &'static str) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Set retry status.
    #[must_use]
    pub fn with_status(mut self, status: ErrorStatus) -> Self {
        self.status = status;
        self
    }

    /// Attach the underlying error source.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Create a not found error with path.
    #[must_use]
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::new(StorageErrorKind::NotFound).with_path(path)
    }

    /// Create a storage error from an I/O error.
    #[must_use]
    pub fn io(err: std::io::Error, path: Option<PathBuf>) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => StorageErrorKind::NotFound,
            std::io::ErrorKind::PermissionDenied => StorageErrorKind::PermissionDenied,
            std::io::ErrorKind::TimedOut => StorageErrorKind::Timeout,
            _ => StorageErrorKind::Other,
        };
        let status = match err.kind() {
            std::io::ErrorKind::TimedOut | std::io::ErrorKind::Interrupted => {
                ErrorStatus::Temporary
            }
            _ => ErrorStatus::Permanent,
        };
        let mut error = Self::new(kind).with_status(status).with_source(err);
        if let Some(p) = path {
            error = error.with_path(p);
        }
        error
    }

    /// Semantic error category.
    #[must_use]
    pub fn kind(&self) -> &StorageErrorKind {
        &self.kind
    }
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: "[Backend] Kind: message (path: /foo/bar)"
        if let Some(backend) = self.backend {
            write!(f, "[{backend}] ")?;
        }

        let kind_str = match self.kind {
            StorageErrorKind::NotFound => "Not found",
            StorageErrorKind::PermissionDenied => "Permission denied",
            StorageErrorKind::InvalidPath => "Invalid path",
            StorageErrorKind::Cycle => "Directory cycle",
            StorageErrorKind::Timeout => "Timeout",
            StorageErrorKind::Other => "Error",
        };

        write!(f, "{kind_str}")?;

        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }

        if let Some(path) = &self.path {
            write!(f, " (path: {})", path.display())?;
        }

        Ok(())
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Synchronous directory-listing and file-read capability.
///
/// Implementations decide how symlinks and cycles are handled; a directory
/// that cannot be listed safely must be reported as an error for that
/// directory only, so that callers can skip the affected subtree.
pub trait Storage: Send + Sync {
    /// Identifier of the storage root, used as a cache key by consumers.
    fn root(&self) -> &Path;

    /// List the direct children of a directory.
    ///
    /// Hidden entries (names starting with `.`) are not returned. Order is
    /// unspecified; consumers sort.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the directory doesn't exist, can't be
    /// read, or is part of a symlink cycle.
    fn list(&self, dir: &Path) -> Result<Vec<StorageEntry>, StorageError>;

    /// Read a document's full content.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the document doesn't exist or can't be read.
    fn read(&self, path: &Path) -> Result<String, StorageError>;
}
