//! Service-wide defaults.

/// Port the API server listens on unless overridden.
pub const DEFAULT_PORT: u16 = 1337;

/// Address the API server binds to unless overridden.
pub const DEFAULT_BIND: &str = "0.0.0.0";

/// How long a fetched mempool snapshot stays fresh, in seconds.
pub const DEFAULT_SNAPSHOT_TTL_SECS: u64 = 10;

/// Maximum number of upstream URLs kept in the snapshot cache.
pub const DEFAULT_CACHE_MAX_ENTRIES: usize = 1024;

/// Timeout for a single upstream request, in seconds.
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;

/// Largest upstream response body read, in bytes.
pub const DEFAULT_UPSTREAM_MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

/// Plaintext body served on `GET /`.
pub const BANNER: &str = "Fast Mempool Locator is running! ~ FML";

/// Path of the lookup endpoint.
pub const LOOKUP_PATH: &str = "/get_mempool_item_by_parent_coin_info";
