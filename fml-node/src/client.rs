//! HTTP client for a full node's mempool endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::LOCATION;
use reqwest::redirect;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use fml_core::constants::{DEFAULT_UPSTREAM_MAX_BODY_BYTES, DEFAULT_UPSTREAM_TIMEOUT_SECS};
use fml_core::error::{FmlError, Result};
use fml_core::traits::MempoolSource;
use fml_core::types::MempoolSnapshot;

use crate::policy::UpstreamPolicy;

const MAX_REDIRECTS: usize = 10;

/// Full-node client configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeClientConfig {
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// Largest response body read before giving up
    pub max_body_bytes: usize,
    /// Hosts redirects may lead to
    pub policy: UpstreamPolicy,
}

impl Default for NodeClientConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: DEFAULT_UPSTREAM_TIMEOUT_SECS,
            max_body_bytes: DEFAULT_UPSTREAM_MAX_BODY_BYTES,
            policy: UpstreamPolicy::allow_all(),
        }
    }
}

/// Follows redirects only to URLs the policy accepts.
///
/// A rejected redirect is not followed; the 3xx response is handed back and
/// reported by [`FullNodeClient::get_all_mempool_items`].
fn redirect_policy(policy: &UpstreamPolicy) -> redirect::Policy {
    if policy.is_open() {
        return redirect::Policy::limited(MAX_REDIRECTS);
    }

    let policy = policy.clone();
    redirect::Policy::custom(move |attempt| {
        if attempt.previous().len() > MAX_REDIRECTS {
            attempt.error("too many redirects")
        } else if policy.check(attempt.url().as_str()).is_err() {
            attempt.stop()
        } else {
            attempt.follow()
        }
    })
}

/// Fetches mempool snapshots over HTTP.
#[derive(Clone, Debug)]
pub struct FullNodeClient {
    config: NodeClientConfig,
    http_client: reqwest::Client,
}

impl FullNodeClient {
    /// Creates a client with default configuration.
    pub fn new() -> Result<Self> {
        Self::with_config(NodeClientConfig::default())
    }

    /// Creates a client with custom configuration.
    pub fn with_config(config: NodeClientConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .redirect(redirect_policy(&config.policy))
            .user_agent(concat!("fml/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FmlError::ConfigError(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// GETs `request_url` and decodes the body as a mempool snapshot.
    ///
    /// The HTTP status is not checked: an error status whose body still
    /// decodes is returned like any other snapshot. Redirects to hosts outside
    /// the policy fail with [`FmlError::UpstreamNotAllowed`], and bodies larger
    /// than `max_body_bytes` with [`FmlError::InvalidUpstreamResponse`].
    #[instrument(skip(self))]
    pub async fn get_all_mempool_items(&self, request_url: &str) -> Result<MempoolSnapshot> {
        let mut response = self
            .http_client
            .get(request_url)
            .send()
            .await
            .map_err(|e| self.transport_error(request_url, e))?;

        let status = response.status();
        if status.is_redirection() && !self.config.policy.is_open() {
            if let Some(location) = response.headers().get(LOCATION) {
                let location = String::from_utf8_lossy(location.as_bytes()).into_owned();
                warn!(request_url, %location, "Refusing redirect outside allowed hosts");
                return Err(FmlError::UpstreamNotAllowed(format!("redirect to '{location}'")));
            }
        }
        if !status.is_success() {
            warn!(request_url, %status, "Upstream returned non-success status");
        }

        let limit = self.config.max_body_bytes;
        let too_large = || FmlError::InvalidUpstreamResponse {
            url: request_url.to_string(),
            reason: format!("body exceeds {limit} bytes"),
        };

        if response.content_length().is_some_and(|len| len > limit as u64) {
            return Err(too_large());
        }

        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| self.transport_error(request_url, e))?
        {
            if body.len() + chunk.len() > limit {
                return Err(too_large());
            }
            body.extend_from_slice(&chunk);
        }

        let snapshot: MempoolSnapshot =
            serde_json::from_slice(&body).map_err(|e| FmlError::InvalidUpstreamResponse {
                url: request_url.to_string(),
                reason: e.to_string(),
            })?;

        debug!(
            request_url,
            success = snapshot.success,
            items = snapshot.mempool_items.len(),
            "Fetched mempool snapshot"
        );
        Ok(snapshot)
    }

    fn transport_error(&self, request_url: &str, err: reqwest::Error) -> FmlError {
        if err.is_timeout() {
            FmlError::UpstreamTimeout {
                url: request_url.to_string(),
                seconds: self.config.timeout_seconds,
            }
        } else {
            FmlError::UpstreamUnavailable {
                url: request_url.to_string(),
                reason: err.to_string(),
            }
        }
    }
}

#[async_trait]
impl MempoolSource for FullNodeClient {
    async fn fetch_snapshot(&self, request_url: &str) -> Result<MempoolSnapshot> {
        self.get_all_mempool_items(request_url).await
    }
}
