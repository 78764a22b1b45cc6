//! DTOs for API responses.

use chrono::{DateTime, Utc};
use serde::Serialize;

use fml_cache::CacheStats;
use fml_core::types::SpendBundle;

/// Response for a parent-coin lookup.
///
/// `item` serializes as `null` when nothing matched.
#[derive(Debug, Serialize)]
pub struct LookupResponse {
    /// The owning spend bundle
    pub item: Option<SpendBundle>,
}

/// Response for the health check.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always "ok"
    pub status: String,
    /// Crate version
    pub version: String,
    /// When the server started
    pub started_at: DateTime<Utc>,
    /// Seconds since start
    pub uptime_seconds: u64,
    /// Snapshot cache statistics
    pub cache: CacheStats,
}
