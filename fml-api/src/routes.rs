//! API route configuration.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use fml_core::constants::LOOKUP_PATH;

use crate::handlers;
use crate::state::AppState;

/// Creates the API router with all routes configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Liveness
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))

        // Lookup
        .route(LOOKUP_PATH, post(handlers::get_mempool_item_by_parent_coin_info))

        .with_state(state)
}
