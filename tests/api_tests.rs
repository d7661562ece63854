mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    routing::get,
    Router,
};
use sea_orm::DatabaseConnection;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use osrs_price_tracker::services::repository::CurrentPrice;
use osrs_price_tracker::{handlers, AppState};

use crate::common::{build_updater, item, MemoryRepository, StubFeed};

fn test_state(repo: Arc<MemoryRepository>) -> AppState {
    let feed = Arc::new(StubFeed::default());
    let (updater, sockets) = build_updater(feed, Arc::clone(&repo), Duration::from_secs(300));

    AppState {
        // No live database behind the handler tests; reads go through
        // the in-memory repository and health reports the db as down
        db: DatabaseConnection::Disconnected,
        repo,
        updater,
        sockets,
    }
}

fn test_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::items::get_root))
        .route("/api/items", get(handlers::items::get_items))
        .route("/api/items/{id}", get(handlers::items::get_item))
        .route("/api/health", get(handlers::items::health_check))
        .with_state(state)
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_root_banner() {
    let app = test_router(test_state(Arc::new(MemoryRepository::default())));

    let (status, json) = get_json(app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "running");
}

#[tokio::test]
async fn test_get_items_returns_sorted_listing() {
    let repo = Arc::new(MemoryRepository::seeded(vec![
        item(2, "Cannonball"),
        item(1, "Coal"),
    ]));
    repo.prices.lock().insert(
        1,
        CurrentPrice {
            item_id: 1,
            high_price: Some(150),
            high_time: Some(100),
            low_price: Some(140),
            low_time: Some(100),
        },
    );

    let app = test_router(test_state(repo));
    let (status, json) = get_json(app, "/api/items").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], 2);
    assert_eq!(json["source"], "database");

    let items = json["items"].as_array().unwrap();
    assert_eq!(items[0]["name"], "Cannonball");
    assert_eq!(items[0]["high_price"], Value::Null);
    assert_eq!(items[1]["name"], "Coal");
    assert_eq!(items[1]["high_price"], 150);
    assert_eq!(items[1]["low_price"], 140);
}

#[tokio::test]
async fn test_get_item_found_and_missing() {
    let repo = Arc::new(MemoryRepository::seeded(vec![item(1, "Coal")]));
    let state = test_state(repo);

    let (status, json) = get_json(test_router(state.clone()), "/api/items/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["id"], 1);
    assert_eq!(json["name"], "Coal");

    let (status, json) = get_json(test_router(state), "/api/items/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Item not found");
}

#[tokio::test]
async fn test_health_reports_database_down() {
    let app = test_router(test_state(Arc::new(MemoryRepository::default())));

    let (status, json) = get_json(app, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "unhealthy");
    assert_eq!(json["database"], "unhealthy");
    assert_eq!(json["cache"], "healthy");
    assert_eq!(json["connected_clients"], 0);
}
