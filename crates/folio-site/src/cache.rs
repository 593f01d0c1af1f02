//! Process-wide document tree cache.
//!
//! The document root is treated as a static snapshot for the lifetime of the
//! process, so a tree is built at most once per root and tree configuration.
//! Failed builds are not cached.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock, RwLock};

use folio_config::NavigationConfig;

use crate::entry::DocumentEntry;
use crate::tree::TreeError;

/// Shared handle to a built tree.
pub type SharedTree = Arc<Vec<DocumentEntry>>;

/// Everything a built tree depends on.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TreeKey {
    /// Storage root.
    pub root: PathBuf,
    /// Document extension without the dot.
    pub extension: String,
    /// Priority and reference-folder configuration.
    pub navigation: NavigationConfig,
}

impl TreeKey {
    #[must_use]
    pub fn new(root: &Path, extension: &str, navigation: &NavigationConfig) -> Self {
        Self {
            root: root.to_path_buf(),
            extension: extension.to_owned(),
            navigation: navigation.clone(),
        }
    }
}

static GLOBAL: LazyLock<Arc<TreeCache>> = LazyLock::new(|| Arc::new(TreeCache::new()));

/// Cache of built document trees.
#[derive(Default)]
pub struct TreeCache {
    trees: RwLock<HashMap<TreeKey, SharedTree>>,
}

impl TreeCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide cache.
    #[must_use]
    pub fn global() -> Arc<Self> {
        Arc::clone(&GLOBAL)
    }

    /// Return the tree for `key`, building it with `build` on a miss.
    ///
    /// # Errors
    ///
    /// Returns the error from `build`; nothing is cached in that case.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn get_or_build(
        &self,
        key: &TreeKey,
        build: impl FnOnce() -> Result<Vec<DocumentEntry>, TreeError>,
    ) -> Result<SharedTree, TreeError> {
        if let Some(tree) = self.trees.read().unwrap().get(key) {
            tracing::debug!(root = %key.root.display(), "Document tree cache hit");
            return Ok(Arc::clone(tree));
        }

        let tree = Arc::new(build()?);
        let mut trees = self.trees.write().unwrap();
        // Another caller may have finished first; keep whichever landed.
        let tree = trees.entry(key.clone()).or_insert(tree);
        Ok(Arc::clone(tree))
    }

    /// Drop every cached tree under `root`, whatever its configuration.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn invalidate(&self, root: &Path) {
        self.trees.write().unwrap().retain(|key, _| key.root != root);
    }
}
