//! API route handlers.

use std::sync::Arc;

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use chrono::Utc;
use tracing::debug;

use fml_core::constants::BANNER;
use fml_core::types::LookupRequest;

use crate::dto::*;
use crate::error::ApiError;
use crate::state::AppState;

type Result<T> = std::result::Result<T, ApiError>;

/// GET /
pub async fn root() -> &'static str {
    BANNER
}

/// GET /health
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let uptime = (Utc::now() - state.started_at).num_seconds().max(0) as u64;

    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        started_at: state.started_at,
        uptime_seconds: uptime,
        cache: state.locator.cache_stats(),
    })
}

/// POST /get_mempool_item_by_parent_coin_info
///
/// Responds `{"item": null}` when nothing matched or the node reported
/// `success: false`.
pub async fn get_mempool_item_by_parent_coin_info(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<LookupRequest>, JsonRejection>,
) -> Result<Json<LookupResponse>> {
    let Json(req) = payload?;

    let result = state.locator.locate(&req).await?;

    debug!(
        parent_coin_info = %req.parent_coin_info,
        found = result.item.is_some(),
        from_cache = result.from_cache,
        "Served lookup"
    );

    Ok(Json(LookupResponse { item: result.item }))
}
