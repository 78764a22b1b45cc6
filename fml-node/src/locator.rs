//! Cached parent-coin locator.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use fml_cache::{CacheConfig, CacheStats, ExpiringCache};
use fml_core::error::Result;
use fml_core::traits::MempoolSource;
use fml_core::types::{LookupRequest, MempoolSnapshot, SpendBundle};

use crate::policy::UpstreamPolicy;

/// Locator configuration.
#[derive(Clone, Debug, Default)]
pub struct LocatorConfig {
    /// Snapshot cache capacity and TTL
    pub cache: CacheConfig,
    /// Accepted upstream URLs
    pub policy: UpstreamPolicy,
}

/// Finds pending spend bundles by parent coin info.
///
/// Resolves a lookup by:
/// 1. Validating the upstream URL against the policy
/// 2. Reusing a fresh cached snapshot for that URL, or fetching one
/// 3. Scanning the snapshot for a coin spend with the requested parent
///
/// Fetches happen outside the cache lock. Concurrent misses on the same URL
/// each fetch, and the last one to finish wins the cache slot. Failed
/// fetches are never cached.
pub struct MempoolLocator {
    source: Arc<dyn MempoolSource>,
    cache: ExpiringCache<Arc<MempoolSnapshot>>,
    policy: UpstreamPolicy,
}

impl MempoolLocator {
    /// Creates a locator over the given snapshot source.
    pub fn new(source: Arc<dyn MempoolSource>, config: LocatorConfig) -> Self {
        Self {
            source,
            cache: ExpiringCache::with_config(config.cache),
            policy: config.policy,
        }
    }

    /// Looks up the spend bundle spending a child of `request.parent_coin_info`.
    #[instrument(skip(self, request), fields(parent_coin_info = %request.parent_coin_info))]
    pub async fn locate(&self, request: &LookupRequest) -> Result<LocateResult> {
        let (snapshot, from_cache) = self.snapshot(&request.request_url).await?;

        let item = snapshot
            .find_by_parent_coin_info(&request.parent_coin_info)
            .cloned();

        debug!(found = item.is_some(), from_cache, "Lookup complete");

        Ok(LocateResult { item, from_cache })
    }

    /// Returns the snapshot for `request_url`, fetching on a cache miss.
    ///
    /// The flag is true when the snapshot came from the cache.
    #[instrument(skip(self))]
    pub async fn snapshot(&self, request_url: &str) -> Result<(Arc<MempoolSnapshot>, bool)> {
        self.policy.check(request_url)?;

        if let Some(snapshot) = self.cache.get(request_url) {
            debug!(request_url, "Cache hit");
            return Ok((snapshot, true));
        }

        debug!(request_url, "Cache miss, fetching");

        let snapshot = Arc::new(self.source.fetch_snapshot(request_url).await?);

        info!(
            request_url,
            success = snapshot.success,
            items = snapshot.mempool_items.len(),
            coin_spends = snapshot.coin_spend_count(),
            "Fetched mempool snapshot"
        );

        self.cache.set(request_url, Arc::clone(&snapshot));

        Ok((snapshot, false))
    }

    /// Drops expired snapshots, returning how many were removed.
    pub fn cleanup_expired(&self) -> usize {
        self.cache.cleanup_expired()
    }

    /// Returns snapshot cache statistics.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

impl std::fmt::Debug for MempoolLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MempoolLocator")
            .field("cache", &self.cache)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

/// Result of a lookup with metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocateResult {
    /// The owning spend bundle, if any coin spend matched
    pub item: Option<SpendBundle>,
    /// Whether the snapshot came from cache
    pub from_cache: bool,
}
