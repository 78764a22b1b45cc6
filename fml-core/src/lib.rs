//! # FML Core
//!
//! Core types, errors, and traits for the Fast Mempool Locator.
//!
//! This crate provides the building blocks used by all other FML crates:
//!
//! - **Types**: The full-node mempool schema (coins, coin spends, spend bundles)
//! - **Lookup**: Finding the spend bundle that spends a given parent coin
//! - **Errors**: Error types shared across the workspace
//! - **Traits**: The seam between the locator and the upstream node
//!
//! ## Example
//!
//! ```rust
//! use fml_core::MempoolSnapshot;
//!
//! let json = r#"{"success": true, "mempool_items": {}}"#;
//! let snapshot: MempoolSnapshot = serde_json::from_str(json).unwrap();
//! assert!(snapshot.find_by_parent_coin_info("0xabc").is_none());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod constants;
pub mod error;
pub mod lookup;
pub mod traits;
pub mod types;

pub use constants::*;
pub use error::{FmlError, Result};
pub use lookup::find_spend_bundle;
pub use traits::MempoolSource;
pub use types::*;
