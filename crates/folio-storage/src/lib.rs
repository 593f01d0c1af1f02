//! Document source abstraction for folio.
//!
//! This crate provides a [`Storage`] trait for listing and reading documents
//! independently of where they live. This enables:
//!
//! - **Unit testing** without touching the real filesystem
//! - **Clean separation** between tree-building logic and I/O operations
//!
//! # Architecture
//!
//! The crate provides:
//! - [`Storage`] trait with `list()` and `read()` methods
//! - [`FsStorage`] implementation for the local filesystem with symlink
//!   containment and cycle detection
//! - [`MockStorage`] for testing (behind `mock` feature flag)
//!
//! # Example
//!
//! ```ignore
//! use std::path::{Path, PathBuf};
//! use folio_storage::{FsStorage, Storage};
//!
//! let storage = FsStorage::new(PathBuf::from("docs"));
//! for entry in storage.list(Path::new(""))? {
//!     println!("{} (dir: {})", entry.name, entry.is_dir);
//! }
//! ```

mod fs;
#[cfg(feature = "mock")]
mod mock;
mod storage;

pub use fs::FsStorage;
#[cfg(feature = "mock")]
pub use mock::MockStorage;
pub use storage::{ErrorStatus, Storage, StorageEntry, StorageError, StorageErrorKind};
