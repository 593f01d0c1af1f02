//! String helpers for [`CacheBucket`].

use crate::CacheBucket;

/// UTF-8 convenience methods, available on every [`CacheBucket`] through a
/// blanket impl so the base trait stays byte-oriented and object-safe.
pub trait CacheBucketExt: CacheBucket {
    /// Retrieve a cached UTF-8 string. Invalid UTF-8 counts as a miss.
    fn get_string(&self, key: &str) -> Option<String> {
        let bytes = self.get(key)?;
        String::from_utf8(bytes).ok()
    }

    /// Store a string value.
    fn set_string(&self, key: &str, value: &str) {
        self.set(key, value.as_bytes());
    }
}

impl<B: CacheBucket + ?Sized> CacheBucketExt for B {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Cache, MemoryCache};

    #[test]
    fn test_get_string_rejects_invalid_utf8() {
        let cache = MemoryCache::default();
        let bucket = cache.bucket("diagrams");

        bucket.set("bad", &[0xFF, 0xFE]);
        assert_eq!(bucket.get_string("bad"), None);

        bucket.set_string("good", "<svg>ü</svg>");
        assert_eq!(bucket.get_string("good").as_deref(), Some("<svg>ü</svg>"));
    }
}
