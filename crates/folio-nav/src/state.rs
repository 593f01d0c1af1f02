//! Expanded-folder state.
//!
//! [`NavigationStateStore`] owns the set of open folders. It loads the set
//! once from a [`KeyValueStore`], mutates it only through toggles, and
//! persists after every change. Stored data that cannot be parsed is
//! treated as an empty set; failed writes are logged and the in-memory set
//! stays authoritative.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::kv::KeyValueStore;

/// Set of expanded folder keys (slugs joined with `/`).
///
/// Persisted as a JSON array of strings in sorted order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExpandedFolderSet(BTreeSet<String>);

impl ExpandedFolderSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.0.contains(path)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Copy of this set with `path` added if absent, removed if present.
    #[must_use]
    pub fn toggled(&self, path: &str) -> Self {
        let mut next = self.0.clone();
        if !next.remove(path) {
            next.insert(path.to_owned());
        }
        Self(next)
    }

    /// Parse the persisted form.
    ///
    /// # Errors
    ///
    /// Returns an error unless `json` is an array of strings.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let paths: Vec<String> = serde_json::from_str(json)?;
        Ok(paths.into_iter().collect())
    }

    /// Persisted form.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::Value::from(self.0.iter().cloned().collect::<Vec<_>>()).to_string()
    }
}

impl FromIterator<String> for ExpandedFolderSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> FromIterator<&'a str> for ExpandedFolderSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self(iter.into_iter().map(str::to_owned).collect())
    }
}

type Observer = Box<dyn Fn(&ExpandedFolderSet) + Send + Sync>;

struct Inner {
    expanded: ExpandedFolderSet,
    revision: u64,
}

/// Owner of the expanded-folder set.
pub struct NavigationStateStore {
    store: Arc<dyn KeyValueStore>,
    key: String,
    inner: Mutex<Inner>,
    observers: Mutex<Vec<Observer>>,
}

impl NavigationStateStore {
    /// Create a store persisting under `key`. Starts empty; call
    /// [`load`](Self::load) to read the persisted set.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            inner: Mutex::new(Inner {
                expanded: ExpandedFolderSet::new(),
                revision: 0,
            }),
            observers: Mutex::new(Vec::new()),
        }
    }

    /// Read the persisted set and make it current.
    ///
    /// Missing, unreadable or malformed data yields an empty set.
    pub fn load(&self) -> ExpandedFolderSet {
        let expanded = match self.store.get(&self.key) {
            Ok(Some(json)) => ExpandedFolderSet::from_json(&json).unwrap_or_else(|e| {
                tracing::warn!(key = %self.key, error = %e, "Ignoring malformed navigation state");
                ExpandedFolderSet::new()
            }),
            Ok(None) => ExpandedFolderSet::new(),
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Cannot read navigation state");
                ExpandedFolderSet::new()
            }
        };

        self.lock().expanded = expanded.clone();
        expanded
    }

    /// Current set.
    pub fn expanded(&self) -> ExpandedFolderSet {
        self.lock().expanded.clone()
    }

    /// True if `path` is currently expanded.
    pub fn is_expanded(&self, path: &str) -> bool {
        self.lock().expanded.contains(path)
    }

    /// Number of changes applied since creation.
    pub fn revision(&self) -> u64 {
        self.lock().revision
    }

    /// Toggle one folder, persist, and return the new set.
    pub fn toggle(&self, path: &str) -> ExpandedFolderSet {
        self.apply_batch([path])
    }

    /// Toggle each of `paths` in order, then persist and notify once.
    ///
    /// Nothing is persisted or notified if the resulting set equals the
    /// current one (e.g. the same path toggled twice).
    pub fn apply_batch<'a>(&self, paths: impl IntoIterator<Item = &'a str>) -> ExpandedFolderSet {
        let mut inner = self.lock();
        let next = paths
            .into_iter()
            .fold(inner.expanded.clone(), |set, path| set.toggled(path));
        if next == inner.expanded {
            tracing::debug!(key = %self.key, "Navigation state unchanged");
            return next;
        }

        inner.expanded = next.clone();
        inner.revision += 1;
        // Persisting under the lock keeps the stored set in toggle order.
        self.write(&next);
        drop(inner);

        self.notify(&next);
        next
    }

    /// Write `set` to the backing store. Failures are logged, not returned.
    pub fn persist(&self, set: &ExpandedFolderSet) {
        let _inner = self.lock();
        self.write(set);
    }

    /// Call `observer` with the new set after every change.
    pub fn subscribe(&self, observer: impl Fn(&ExpandedFolderSet) + Send + Sync + 'static) {
        self.observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Box::new(observer));
    }

    fn write(&self, set: &ExpandedFolderSet) {
        if let Err(e) = self.store.set(&self.key, &set.to_json()) {
            tracing::warn!(key = %self.key, error = %e, "Cannot persist navigation state");
        }
    }

    fn notify(&self, set: &ExpandedFolderSet) {
        for observer in self.observers.lock().unwrap_or_else(PoisonError::into_inner).iter() {
            observer(set);
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
