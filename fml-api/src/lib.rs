//! # FML API Server
//!
//! HTTP front end for the Fast Mempool Locator.
//!
//! ## Endpoints
//!
//! - `GET /` - Plaintext liveness banner
//! - `GET /health` - Version, uptime and cache statistics
//! - `POST /get_mempool_item_by_parent_coin_info` - Find the pending spend
//!   bundle spending a child of a parent coin
//!
//! ## Example
//!
//! ```rust,ignore
//! use fml_api::{ApiServer, ApiConfig};
//!
//! let config = ApiConfig::from_env();
//! let server = ApiServer::new(config)?;
//! server.run(([0, 0, 0, 0], 1337)).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod dto;
mod error;
mod handlers;
mod routes;
mod state;

pub use dto::{HealthResponse, LookupResponse};
pub use error::ApiError;
pub use routes::create_router;
pub use state::{ApiConfig, AppState};

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use fml_core::error::Result;

/// Largest accepted request body.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// How often expired snapshots are swept from the cache.
const CACHE_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// API server for FML.
pub struct ApiServer {
    state: Arc<AppState>,
}

impl ApiServer {
    /// Creates a new API server with the given configuration.
    pub fn new(config: ApiConfig) -> Result<Self> {
        Ok(Self {
            state: Arc::new(AppState::new(config)?),
        })
    }

    /// Creates the router with all routes configured.
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        create_router(self.state.clone())
            .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    }

    /// Runs the server on the given address.
    pub async fn run(self, addr: impl Into<SocketAddr>) -> std::io::Result<()> {
        let addr = addr.into();
        let listener = tokio::net::TcpListener::bind(addr).await?;

        info!("FML API server listening on {}", addr);

        self.spawn_cache_sweeper();
        axum::serve(listener, self.router()).await
    }

    fn spawn_cache_sweeper(&self) {
        let state = self.state.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(CACHE_SWEEP_INTERVAL);
            loop {
                interval.tick().await;
                let removed = state.locator.cleanup_expired();
                if removed > 0 {
                    debug!(removed, "Swept expired snapshots");
                }
            }
        });
    }
}
