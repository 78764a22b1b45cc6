//! Which upstream URLs a caller may point the locator at.

use std::net::Ipv6Addr;

use serde::{Deserialize, Serialize};
use url::{Host, Url};

use fml_core::error::{FmlError, Result};

/// Restricts caller-supplied upstream URLs.
///
/// URLs must be absolute `http`/`https`. An empty allow-list permits any host.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamPolicy {
    /// Lowercased host names and bare IP literals; empty means any host
    pub allowed_hosts: Vec<String>,
}

impl UpstreamPolicy {
    /// Allows any http(s) host.
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Allows only the given hosts (case-insensitive). Blank entries are skipped.
    ///
    /// IPv6 literals may be given with or without brackets.
    pub fn allow_hosts<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            allowed_hosts: hosts
                .into_iter()
                .map(|h| {
                    let h = h.as_ref().trim();
                    let bare = h
                        .strip_prefix('[')
                        .and_then(|inner| inner.strip_suffix(']'))
                        .unwrap_or(h);
                    match bare.parse::<Ipv6Addr>() {
                        Ok(addr) => addr.to_string(),
                        Err(_) => bare.to_lowercase(),
                    }
                })
                .filter(|h| !h.is_empty())
                .collect(),
        }
    }

    /// Returns true if no allow-list is configured.
    pub fn is_open(&self) -> bool {
        self.allowed_hosts.is_empty()
    }

    /// Validates a request URL, returning it parsed.
    pub fn check(&self, request_url: &str) -> Result<Url> {
        let invalid = |reason: &str| FmlError::InvalidRequestUrl {
            url: request_url.to_string(),
            reason: reason.to_string(),
        };

        let url = Url::parse(request_url).map_err(|e| invalid(&e.to_string()))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid("scheme must be http or https"));
        }

        let host = match url.host().ok_or_else(|| invalid("missing host"))? {
            Host::Domain(domain) => domain.to_lowercase(),
            Host::Ipv4(addr) => addr.to_string(),
            Host::Ipv6(addr) => addr.to_string(),
        };

        if !self.is_open() && !self.allowed_hosts.contains(&host) {
            return Err(FmlError::UpstreamNotAllowed(host));
        }

        Ok(url)
    }
}
