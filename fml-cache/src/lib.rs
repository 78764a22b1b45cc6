//! Expiring cache for FML.
//!
//! Generic in-memory cache keyed by string, with per-entry expiration and a
//! least-recently-used capacity bound.

mod cache;

pub use cache::{CacheConfig, CacheStats, ExpiringCache};
