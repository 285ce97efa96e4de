//! Cache coherence layer
//!
//! Keyed reads go through a read-through cache; every mutation invalidates
//! the affected keys. The store behind the cache is advisory only: the
//! database remains the source of truth, and no uniqueness check or write
//! ever consults the cache.
//!
//! Cache failures are explicit values ([`CacheError`]) at the store boundary,
//! and [`CacheLayer`] is the single place that decides to degrade them to a
//! miss. Callers never see a cache failure.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Failure of the underlying key-value store.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache unavailable: {0}")]
    Unavailable(String),
}

pub type CacheResult<T> = Result<T, CacheError>;

/// A generic key-value store with expiring entries.
///
/// Implementations must be cheap to call from request handlers; the
/// in-process [`MemoryCache`] is the default. A networked store would
/// implement the same trait.
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &str) -> CacheResult<Option<String>>;
    fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()>;
    fn delete(&self, key: &str) -> CacheResult<()>;
}

struct MemoryEntry {
    value: String,
    expires_at: Instant,
}

/// In-process cache store with per-entry time-to-live.
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, MemoryEntry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStore for MemoryCache {
    fn get(&self, key: &str) -> CacheResult<Option<String>> {
        {
            let entries = self
                .entries
                .read()
                .map_err(|e| CacheError::Unavailable(e.to_string()))?;
            match entries.get(key) {
                None => return Ok(None),
                Some(entry) if entry.expires_at > Instant::now() => {
                    return Ok(Some(entry.value.clone()))
                }
                Some(_) => {}
            }
        }
        // Entry expired; drop it so the map does not grow unbounded.
        self.delete(key)?;
        Ok(None)
    }

    fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| CacheError::Unavailable(e.to_string()))?;
        entries.insert(
            key.to_string(),
            MemoryEntry {
                value: value.to_string(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    fn delete(&self, key: &str) -> CacheResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| CacheError::Unavailable(e.to_string()))?;
        entries.remove(key);
        Ok(())
    }
}

/// Typed read-through helpers over a [`CacheStore`].
///
/// All methods swallow store failures: a failed read is a miss, a failed
/// write or invalidation is logged at debug level and otherwise ignored.
#[derive(Clone)]
pub struct CacheLayer {
    store: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl CacheLayer {
    pub fn new(store: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Fetch and deserialize a cached value. Any failure is a miss.
    pub fn fetch<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.store.get(key) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => Some(value),
                Err(err) => {
                    tracing::debug!(key, %err, "discarding undecodable cache entry");
                    if let Err(err) = self.store.delete(key) {
                        tracing::debug!(key, %err, "failed to drop undecodable cache entry");
                    }
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                tracing::debug!(key, %err, "cache read failed, treating as miss");
                None
            }
        }
    }

    /// Serialize and store a value with the configured TTL.
    pub fn put<T: Serialize>(&self, key: &str, value: &T) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::debug!(key, %err, "skipping cache write for unserializable value");
                return;
            }
        };
        if let Err(err) = self.store.set_with_ttl(key, &raw, self.ttl) {
            tracing::debug!(key, %err, "cache write failed");
        }
    }

    /// Drop a set of keys. Failures are ignored.
    pub fn invalidate<'a, I>(&self, keys: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        for key in keys {
            if let Err(err) = self.store.delete(key) {
                tracing::debug!(key, %err, "cache invalidation failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Record {
        slug: String,
        stock: i32,
    }

    fn layer_with_ttl(ttl: Duration) -> CacheLayer {
        CacheLayer::new(Arc::new(MemoryCache::new()), ttl)
    }

    #[test]
    fn read_through_round_trip() {
        let cache = layer_with_ttl(Duration::from_secs(60));
        let record = Record {
            slug: "samsung-tv".to_string(),
            stock: 4,
        };

        assert_eq!(cache.fetch::<Record>("product:samsung-tv"), None);
        cache.put("product:samsung-tv", &record);
        assert_eq!(
            cache.fetch::<Record>("product:samsung-tv"),
            Some(record.clone())
        );
    }

    #[test]
    fn invalidation_removes_entry() {
        let cache = layer_with_ttl(Duration::from_secs(60));
        let record = Record {
            slug: "electronics".to_string(),
            stock: 0,
        };
        cache.put("category:electronics", &record);
        cache.invalidate(["category:electronics", "categories:list"]);
        assert_eq!(cache.fetch::<Record>("category:electronics"), None);
    }

    #[test]
    fn expired_entries_are_misses() {
        let store = Arc::new(MemoryCache::new());
        let cache = CacheLayer::new(store, Duration::from_millis(10));
        cache.put(
            "dealer:acme",
            &Record {
                slug: "acme".to_string(),
                stock: 1,
            },
        );
        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(cache.fetch::<Record>("dealer:acme"), None);
    }

    #[test]
    fn undecodable_entry_is_a_miss() {
        let store = Arc::new(MemoryCache::new());
        store
            .set_with_ttl("product:bad", "not json", Duration::from_secs(60))
            .unwrap();
        let cache = CacheLayer::new(store.clone(), Duration::from_secs(60));
        assert_eq!(cache.fetch::<Record>("product:bad"), None);
        // The broken entry is dropped, not served again.
        assert_eq!(store.get("product:bad").unwrap(), None);
    }

    struct BrokenStore;

    impl CacheStore for BrokenStore {
        fn get(&self, _key: &str) -> CacheResult<Option<String>> {
            Err(CacheError::Unavailable("down".into()))
        }
        fn set_with_ttl(&self, _key: &str, _value: &str, _ttl: Duration) -> CacheResult<()> {
            Err(CacheError::Unavailable("down".into()))
        }
        fn delete(&self, _key: &str) -> CacheResult<()> {
            Err(CacheError::Unavailable("down".into()))
        }
    }

    #[test]
    fn store_failures_never_escape() {
        let cache = CacheLayer::new(Arc::new(BrokenStore), Duration::from_secs(60));
        assert_eq!(cache.fetch::<Record>("product:any"), None);
        cache.put(
            "product:any",
            &Record {
                slug: "any".to_string(),
                stock: 2,
            },
        );
        cache.invalidate(["product:any"]);
    }
}
