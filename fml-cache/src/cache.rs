//! In-memory expiring cache.

use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use lru::LruCache;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use fml_core::constants::{DEFAULT_CACHE_MAX_ENTRIES, DEFAULT_SNAPSHOT_TTL_SECS};

/// Cache entry with an absolute deadline.
struct CacheEntry<V> {
    value: V,
    /// `None` when `now + ttl` does not fit in an `Instant`.
    expires_at: Option<Instant>,
}

impl<V> CacheEntry<V> {
    fn new(value: V, ttl: Duration, now: Instant) -> Self {
        Self {
            value,
            expires_at: now.checked_add(ttl),
        }
    }

    fn is_expired_at(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| now >= deadline)
    }
}

/// Cache configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of entries
    pub max_entries: usize,
    /// TTL used by [`ExpiringCache::set`]
    pub default_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_CACHE_MAX_ENTRIES,
            default_ttl: Duration::from_secs(DEFAULT_SNAPSHOT_TTL_SECS),
        }
    }
}

/// Thread-safe cache with per-entry TTL.
///
/// Expired entries are not removed on read; they read as absent until they
/// are overwritten, evicted, or swept by [`cleanup_expired`](Self::cleanup_expired).
/// When full, inserting a new key evicts the least recently used entry.
///
/// Every operation except [`cleanup_expired`](Self::cleanup_expired) holds the
/// lock for one map lookup or insert. The sweep walks all entries, which
/// bounds it by capacity; keep it off the request path. Store cheaply
/// clonable values (e.g. `Arc<T>`).
pub struct ExpiringCache<V> {
    entries: Mutex<LruCache<String, CacheEntry<V>>>,
    config: CacheConfig,
}

impl<V: Clone> ExpiringCache<V> {
    /// Creates a new cache with default configuration.
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    /// Creates a cache with custom configuration.
    ///
    /// A `max_entries` of zero is treated as one.
    pub fn with_config(config: CacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            config,
        }
    }

    /// Gets a fresh value by key.
    ///
    /// Returns `None` if nothing is cached or the entry has expired.
    pub fn get(&self, key: &str) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    pub(crate) fn get_at(&self, key: &str, now: Instant) -> Option<V> {
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(entry) if !entry.is_expired_at(now) => Some(entry.value.clone()),
            _ => None,
        }
    }

    /// Caches a value with the default TTL.
    pub fn set(&self, key: &str, value: V) {
        self.set_with_ttl(key, value, self.config.default_ttl);
    }

    /// Caches a value that stays fresh for `ttl` from now.
    pub fn set_with_ttl(&self, key: &str, value: V, ttl: Duration) {
        self.set_at(key, value, ttl, Instant::now());
    }

    pub(crate) fn set_at(&self, key: &str, value: V, ttl: Duration, now: Instant) {
        let evicted = self
            .entries
            .lock()
            .push(key.to_owned(), CacheEntry::new(value, ttl, now));

        if let Some((evicted_key, _)) = evicted {
            if evicted_key != key {
                debug!(key = %evicted_key, "Evicted least recently used entry");
            }
        }
    }

    /// Removes a cached entry.
    pub fn remove(&self, key: &str) {
        self.entries.lock().pop(key);
    }

    /// Clears all cached entries.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Removes all expired entries, returning how many were dropped.
    pub fn cleanup_expired(&self) -> usize {
        self.cleanup_expired_at(Instant::now())
    }

    pub(crate) fn cleanup_expired_at(&self, now: Instant) -> usize {
        let mut entries = self.entries.lock();
        let expired: Vec<String> = entries
            .iter()
            .filter(|(_, e)| e.is_expired_at(now))
            .map(|(k, _)| k.clone())
            .collect();
        for key in &expired {
            entries.pop(key);
        }
        expired.len()
    }

    /// Returns the number of cached entries, fresh or not.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Returns cache statistics.
    ///
    /// Entries are counted whether fresh or not; telling them apart would
    /// mean walking the whole map under the lock.
    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.lock();
        CacheStats {
            total_entries: entries.len(),
            capacity: entries.cap().get(),
        }
    }
}

impl<V: Clone> Default for ExpiringCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> std::fmt::Debug for ExpiringCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpiringCache")
            .field("len", &self.entries.lock().len())
            .field("config", &self.config)
            .finish()
    }
}

/// Cache statistics.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub capacity: usize,
}
