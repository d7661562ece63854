//! Read endpoints for items and service health
//!
//! Reads always come from the database (source of truth). Listing an
//! item kicks off a passive background check of the refresh marker, so
//! regular traffic keeps the price data fresh without blocking anyone.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use tracing::error;

use crate::models::item::{ErrorResponse, HealthResponse, ItemWithPrice, ItemsResponse};
use crate::services::repository::ItemRepository;
use crate::AppState;

pub async fn get_root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "OSRS Price Tracker API",
        "status": "running",
        "description": "Live updating RuneScape Grand Exchange prices",
    }))
}

pub async fn get_items(
    State(state): State<AppState>,
) -> Result<Json<ItemsResponse>, (StatusCode, Json<ErrorResponse>)> {
    let items = state.repo.all_with_prices().await.map_err(|e| {
        error!("Failed to get items: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Failed to fetch items".to_string(),
            }),
        )
    })?;

    // Non-blocking: refresh runs behind this response if the marker expired
    state.updater.clone().spawn_check();

    Ok(Json(ItemsResponse {
        count: items.len(),
        items,
        timestamp: Utc::now(),
        source: "database".to_string(),
    }))
}

pub async fn get_item(
    State(state): State<AppState>,
    Path(item_id): Path<i32>,
) -> Result<Json<ItemWithPrice>, (StatusCode, Json<ErrorResponse>)> {
    let item = state.repo.one_with_price(item_id).await.map_err(|e| {
        error!("Failed to get item {}: {}", item_id, e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Failed to fetch item".to_string(),
            }),
        )
    })?;

    match item {
        Some(item) => Ok(Json(item)),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "Item not found".to_string(),
            }),
        )),
    }
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = state.db.ping().await.is_ok();

    // The marker cache is in-process, so reachability reduces to the
    // process being alive
    let cache_healthy = true;

    Json(HealthResponse {
        status: if db_healthy && cache_healthy {
            "healthy".to_string()
        } else {
            "unhealthy".to_string()
        },
        database: if db_healthy { "healthy" } else { "unhealthy" }.to_string(),
        cache: "healthy".to_string(),
        connected_clients: state.sockets.connected_clients(),
        timestamp: Utc::now(),
    })
}
