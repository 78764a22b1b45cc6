//! App state: config and the shared locator.

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::warn;

use fml_cache::CacheConfig;
use fml_core::constants::{
    DEFAULT_BIND, DEFAULT_CACHE_MAX_ENTRIES, DEFAULT_PORT, DEFAULT_SNAPSHOT_TTL_SECS,
    DEFAULT_UPSTREAM_MAX_BODY_BYTES, DEFAULT_UPSTREAM_TIMEOUT_SECS,
};
use fml_core::error::Result;
use fml_core::traits::MempoolSource;
use fml_node::{FullNodeClient, LocatorConfig, MempoolLocator, NodeClientConfig, UpstreamPolicy};

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Bind address
    pub bind: String,
    /// Listening port
    pub port: u16,
    /// How long a fetched snapshot is reused, in seconds
    pub snapshot_ttl_seconds: u64,
    /// Maximum number of upstream URLs cached at once
    pub cache_max_entries: usize,
    /// Upstream request timeout, in seconds
    pub upstream_timeout_seconds: u64,
    /// Largest upstream response body accepted, in bytes
    pub upstream_max_body_bytes: usize,
    /// Accepted upstream hosts; empty accepts any
    pub allowed_hosts: Vec<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.into(),
            port: DEFAULT_PORT,
            snapshot_ttl_seconds: DEFAULT_SNAPSHOT_TTL_SECS,
            cache_max_entries: DEFAULT_CACHE_MAX_ENTRIES,
            upstream_timeout_seconds: DEFAULT_UPSTREAM_TIMEOUT_SECS,
            upstream_max_body_bytes: DEFAULT_UPSTREAM_MAX_BODY_BYTES,
            allowed_hosts: Vec::new(),
        }
    }
}

impl ApiConfig {
    /// Reads configuration from `.env` and the environment, falling back to
    /// defaults.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();

        Self {
            bind: std::env::var("FML_BIND").unwrap_or_else(|_| DEFAULT_BIND.into()),
            port: env_parse("FML_PORT", DEFAULT_PORT),
            snapshot_ttl_seconds: env_parse("FML_CACHE_TTL_SECS", DEFAULT_SNAPSHOT_TTL_SECS),
            cache_max_entries: env_parse("FML_CACHE_MAX_ENTRIES", DEFAULT_CACHE_MAX_ENTRIES),
            upstream_timeout_seconds: env_parse(
                "FML_UPSTREAM_TIMEOUT_SECS",
                DEFAULT_UPSTREAM_TIMEOUT_SECS,
            ),
            upstream_max_body_bytes: env_parse(
                "FML_UPSTREAM_MAX_BODY_BYTES",
                DEFAULT_UPSTREAM_MAX_BODY_BYTES,
            ),
            allowed_hosts: std::env::var("FML_ALLOWED_HOSTS")
                .map(|v| parse_host_list(&v))
                .unwrap_or_default(),
        }
    }

    /// The address to listen on.
    pub fn socket_addr(&self) -> std::io::Result<SocketAddr> {
        format!("{}:{}", self.bind, self.port).parse().map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid bind address '{}:{}': {e}", self.bind, self.port),
            )
        })
    }

    fn policy(&self) -> UpstreamPolicy {
        UpstreamPolicy::allow_hosts(&self.allowed_hosts)
    }

    fn node_client_config(&self) -> NodeClientConfig {
        NodeClientConfig {
            timeout_seconds: self.upstream_timeout_seconds,
            max_body_bytes: self.upstream_max_body_bytes,
            policy: self.policy(),
        }
    }

    fn locator_config(&self) -> LocatorConfig {
        LocatorConfig {
            cache: CacheConfig {
                max_entries: self.cache_max_entries,
                default_ttl: Duration::from_secs(self.snapshot_ttl_seconds),
            },
            policy: self.policy(),
        }
    }
}

fn env_parse<T: FromStr>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(name, value = %raw, "Ignoring unparsable setting");
            default
        }),
        Err(_) => default,
    }
}

fn parse_host_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .map(str::to_string)
        .collect()
}

/// Shared state handed to every handler.
#[derive(Debug)]
pub struct AppState {
    pub config: ApiConfig,
    pub locator: MempoolLocator,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Builds state that fetches snapshots from full nodes over HTTP.
    pub fn new(config: ApiConfig) -> Result<Self> {
        let client = FullNodeClient::with_config(config.node_client_config())?;
        Ok(Self::with_source(config, Arc::new(client)))
    }

    /// Builds state around any snapshot source.
    pub fn with_source(config: ApiConfig, source: Arc<dyn MempoolSource>) -> Self {
        let locator = MempoolLocator::new(source, config.locator_config());
        Self {
            config,
            locator,
            started_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.port, 1337);
        assert_eq!(config.snapshot_ttl_seconds, 10);
        assert!(config.allowed_hosts.is_empty());
        assert_eq!(config.socket_addr().unwrap().port(), 1337);
    }

    #[test]
    fn test_parse_host_list() {
        assert_eq!(
            parse_host_list(" node.local, ,127.0.0.1 ,"),
            vec!["node.local".to_string(), "127.0.0.1".to_string()]
        );
        assert!(parse_host_list("").is_empty());
    }

    #[test]
    fn test_invalid_bind() {
        let config = ApiConfig {
            bind: "not an address".into(),
            ..Default::default()
        };
        assert!(config.socket_addr().is_err());
    }

    #[test]
    fn test_locator_config() {
        let config = ApiConfig {
            snapshot_ttl_seconds: 3,
            cache_max_entries: 7,
            allowed_hosts: vec!["Node".into()],
            ..Default::default()
        };
        let locator = config.locator_config();
        assert_eq!(locator.cache.default_ttl, Duration::from_secs(3));
        assert_eq!(locator.cache.max_entries, 7);
        assert_eq!(locator.policy.allowed_hosts, vec!["node".to_string()]);
        assert_eq!(config.node_client_config().policy, locator.policy);
    }

    #[test]
    fn test_env_parse_falls_back_on_garbage() {
        std::env::set_var("FML_TEST_ENV_PARSE_GARBAGE", "abc");
        assert_eq!(env_parse("FML_TEST_ENV_PARSE_GARBAGE", 1337u16), 1337);

        std::env::set_var("FML_TEST_ENV_PARSE_VALID", " 8080 ");
        assert_eq!(env_parse("FML_TEST_ENV_PARSE_VALID", 1337u16), 8080);

        assert_eq!(env_parse("FML_TEST_ENV_PARSE_UNSET", 42usize), 42);

        std::env::set_var("FML_TEST_ENV_PARSE_OVERFLOW", "70000");
        assert_eq!(env_parse("FML_TEST_ENV_PARSE_OVERFLOW", 1337u16), 1337);
    }

    #[test]
    fn test_from_env_wires_allowed_hosts_into_policy() {
        std::env::set_var("FML_ALLOWED_HOSTS", "a, B");
        let config = ApiConfig::from_env();
        std::env::remove_var("FML_ALLOWED_HOSTS");

        assert_eq!(config.allowed_hosts, vec!["a".to_string(), "B".to_string()]);
        assert_eq!(
            config.locator_config().policy.allowed_hosts,
            vec!["a".to_string(), "b".to_string()]
        );
        assert!(config.locator_config().policy.check("http://b:8555/x").is_ok());
        assert!(config.locator_config().policy.check("http://c/x").is_err());
    }
}
