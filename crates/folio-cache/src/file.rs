//! File-based cache implementation.
//!
//! [`FileCache`] stores each entry as a plain file. Keys are sharded by
//! their first two characters so a bucket full of hex digests does not end
//! up as one huge directory:
//!
//! ```text
//! {root}/
//! +-- VERSION
//! +-- diagrams/
//!     +-- 3f/
//!         +-- 3f2a9c...
//! ```
//!
//! Writes go to a temporary sibling first and are renamed into place, so a
//! reader never sees a half-written entry.
//!
//! On construction the `VERSION` file is checked; a missing or different
//! version wipes the whole directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::{Cache, CacheBucket};

/// File-based [`Cache`] rooted at a directory on disk.
pub struct FileCache {
    root: PathBuf,
}

impl FileCache {
    /// Create a new file-based cache at `root`, validating the cache version.
    ///
    /// Errors during validation are logged but never fatal.
    #[must_use]
    pub fn new(root: PathBuf, version: &str) -> Self {
        validate_version(&root, version);
        Self { root }
    }
}

impl Cache for FileCache {
    fn bucket(&self, name: &str) -> Arc<dyn CacheBucket> {
        Arc::new(FileCacheBucket {
            dir: self.root.join(name),
        })
    }
}

struct FileCacheBucket {
    dir: PathBuf,
}

impl FileCacheBucket {
    /// Map a key to its file, or `None` for keys that are not plain names.
    fn entry_path(&self, key: &str) -> Option<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return None;
        }
        let shard = key.get(..2).unwrap_or(key);
        Some(self.dir.join(shard).join(key))
    }
}

impl CacheBucket for FileCacheBucket {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        fs::read(self.entry_path(key)?).ok()
    }

    fn set(&self, key: &str, value: &[u8]) {
        let Some(path) = self.entry_path(key) else {
            tracing::debug!(key, "refusing to cache entry with unsafe key");
            return;
        };
        let Some(parent) = path.parent() else {
            return;
        };
        if let Err(e) = fs::create_dir_all(parent) {
            tracing::debug!("failed to create cache shard: {e}");
            return;
        }

        let tmp = path.with_extension("tmp");
        if let Err(e) = fs::write(&tmp, value).and_then(|()| fs::rename(&tmp, &path)) {
            tracing::debug!("failed to write cache entry {key}: {e}");
            let _ = fs::remove_file(&tmp);
        }
    }
}

/// Validate the cache version, wiping the directory on mismatch.
fn validate_version(root: &Path, version: &str) {
    let version_file = root.join("VERSION");

    match fs::read_to_string(&version_file) {
        Ok(stored) if stored == version => {
            tracing::debug!("cache version matches: {version}");
            return;
        }
        Ok(stored) => {
            tracing::info!(
                "cache version mismatch (stored={stored}, current={version}), wiping cache"
            );
        }
        Err(_) => {
            tracing::info!("no cache VERSION file found, initializing cache");
        }
    }

    if root.exists()
        && let Err(e) = fs::remove_dir_all(root)
    {
        tracing::warn!("failed to remove cache directory: {e}");
    }
    if let Err(e) = fs::create_dir_all(root) {
        tracing::warn!("failed to create cache directory: {e}");
        return;
    }
    if let Err(e) = fs::write(&version_file, version) {
        tracing::warn!("failed to write cache VERSION file: {e}");
    }
}
