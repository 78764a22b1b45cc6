//! Common traits for FML.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::MempoolSnapshot;

/// Something that can produce a mempool snapshot for an upstream URL.
///
/// Implementations might use:
/// - An HTTP client against a full node (production)
/// - Canned snapshots (tests)
#[async_trait]
pub trait MempoolSource: Send + Sync {
    /// Fetches and decodes the mempool snapshot served at `request_url`.
    ///
    /// Only transport and decode failures are errors; a snapshot with
    /// `success: false` is returned as-is.
    async fn fetch_snapshot(&self, request_url: &str) -> Result<MempoolSnapshot>;
}
