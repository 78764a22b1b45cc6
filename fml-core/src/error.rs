//! Error types for FML.
//!
//! Every failure a lookup can hit, from a bad caller URL to an upstream node
//! that returns garbage. A node answering `success: false` is not an error.

use thiserror::Error;

/// Result type alias using `FmlError`.
pub type Result<T> = std::result::Result<T, FmlError>;

/// Main error type for all FML operations.
#[derive(Debug, Error)]
pub enum FmlError {
    // ═══════════════════════════════════════════════════════════════════════════
    // REQUEST ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// The caller-supplied upstream URL is unusable.
    #[error("Invalid request URL '{url}': {reason}")]
    InvalidRequestUrl { url: String, reason: String },

    /// The upstream host is not in the configured allow-list.
    #[error("Upstream host not allowed: {0}")]
    UpstreamNotAllowed(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // UPSTREAM ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Could not reach the upstream node or read its response.
    #[error("Upstream request to '{url}' failed: {reason}")]
    UpstreamUnavailable { url: String, reason: String },

    /// The upstream node did not answer in time.
    #[error("Upstream request to '{url}' timed out after {seconds}s")]
    UpstreamTimeout { url: String, seconds: u64 },

    /// The upstream body is not a mempool snapshot.
    #[error("Invalid response from '{url}': {reason}")]
    InvalidUpstreamResponse { url: String, reason: String },

    // ═══════════════════════════════════════════════════════════════════════════
    // SETUP ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl FmlError {
    /// Returns true if the upstream node is to blame.
    pub fn is_upstream_error(&self) -> bool {
        matches!(
            self,
            FmlError::UpstreamUnavailable { .. }
                | FmlError::UpstreamTimeout { .. }
                | FmlError::InvalidUpstreamResponse { .. }
        )
    }

    /// Returns true if the caller's request is to blame.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            FmlError::InvalidRequestUrl { .. } | FmlError::UpstreamNotAllowed(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FmlError::UpstreamTimeout {
            url: "http://node:8555".into(),
            seconds: 30,
        };
        assert!(err.to_string().contains("http://node:8555"));
        assert!(err.to_string().contains("30s"));
    }

    #[test]
    fn test_error_classification() {
        let unavailable = FmlError::UpstreamUnavailable {
            url: "http://x".into(),
            reason: "connection refused".into(),
        };
        assert!(unavailable.is_upstream_error());
        assert!(!unavailable.is_client_error());

        let not_allowed = FmlError::UpstreamNotAllowed("evil.example".into());
        assert!(not_allowed.is_client_error());
        assert!(!not_allowed.is_upstream_error());

        assert!(!FmlError::ConfigError("x".into()).is_upstream_error());
        assert!(!FmlError::ConfigError("x".into()).is_client_error());
    }
}
