//! # FML Node
//!
//! Talks to a full node's mempool endpoint and answers parent-coin lookups
//! from a short-lived snapshot cache.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod client;
mod locator;
mod policy;

pub use client::{FullNodeClient, NodeClientConfig};
pub use locator::{LocateResult, LocatorConfig, MempoolLocator};
pub use policy::UpstreamPolicy;
