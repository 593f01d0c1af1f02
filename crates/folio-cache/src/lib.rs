//! Cache abstraction layer for folio.
//!
//! Entries are content-addressed: the key already encodes everything the
//! value depends on (for diagrams, a hash of language and source), so there
//! is no separate validity token. Two traits form the core API:
//!
//! - [`Cache`]: Factory for named cache buckets
//! - [`CacheBucket`]: Byte-oriented key-value store
//!
//! # Implementations
//!
//! - [`NullCache`]: No-op implementation (always miss)
//! - [`MemoryCache`]: Process-local implementation, mostly for tests
//! - [`FileCache`]: File-based implementation with version validation
//!
//! # Example
//!
//! ```
//! use folio_cache::{Cache, CacheBucketExt, MemoryCache};
//!
//! let cache = MemoryCache::default();
//! let bucket = cache.bucket("diagrams");
//! bucket.set_string("3f2a", "<svg/>");
//! assert_eq!(bucket.get_string("3f2a").as_deref(), Some("<svg/>"));
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

mod ext;
mod file;

pub use ext::CacheBucketExt;
pub use file::FileCache;

/// A named partition within a [`Cache`].
pub trait CacheBucket: Send + Sync {
    /// Retrieve a cached value, or `None` on miss.
    fn get(&self, key: &str) -> Option<Vec<u8>>;

    /// Store a value, overwriting any previous entry for `key`.
    ///
    /// Failures are swallowed: a cache that cannot be written behaves like
    /// a cache that missed.
    fn set(&self, key: &str, value: &[u8]);
}

/// Factory for named cache [`CacheBucket`]s.
///
/// Buckets with different names never observe each other's entries.
pub trait Cache: Send + Sync {
    /// Open or create a named bucket.
    fn bucket(&self, name: &str) -> Arc<dyn CacheBucket>;
}

/// No-op [`CacheBucket`].
pub struct NullCacheBucket;

impl CacheBucket for NullCacheBucket {
    fn get(&self, _key: &str) -> Option<Vec<u8>> {
        None
    }

    fn set(&self, _key: &str, _value: &[u8]) {}
}

/// No-op [`Cache`] used when caching is disabled.
pub struct NullCache;

impl Cache for NullCache {
    fn bucket(&self, _name: &str) -> Arc<dyn CacheBucket> {
        Arc::new(NullCacheBucket)
    }
}

type Entries = Arc<Mutex<HashMap<String, Vec<u8>>>>;

/// In-memory [`Cache`]. Buckets opened with the same name share entries.
#[derive(Default)]
pub struct MemoryCache {
    buckets: Mutex<HashMap<String, Entries>>,
}

impl Cache for MemoryCache {
    fn bucket(&self, name: &str) -> Arc<dyn CacheBucket> {
        let mut buckets = self
            .buckets
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let entries = Arc::clone(buckets.entry(name.to_owned()).or_default());
        Arc::new(MemoryCacheBucket { entries })
    }
}

struct MemoryCacheBucket {
    entries: Entries,
}

impl CacheBucket for MemoryCacheBucket {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &[u8]) {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(key.to_owned(), value.to_vec());
    }
}
