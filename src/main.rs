use axum::http::HeaderValue;
use axum::{routing::get, Router};
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use osrs_price_tracker::config::Config;
use osrs_price_tracker::handlers;
use osrs_price_tracker::jobs::mapping_sync::start_mapping_sync_job;
use osrs_price_tracker::services::feed::WikiFeedClient;
use osrs_price_tracker::services::marker_cache::MarkerCache;
use osrs_price_tracker::services::price_updater::PriceUpdater;
use osrs_price_tracker::services::repository::{ItemRepository, SeaOrmItemRepository};
use osrs_price_tracker::services::socket_manager::SocketManager;
use osrs_price_tracker::AppState;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,osrs_price_tracker=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("Invalid configuration");

    // Connect to database
    tracing::info!("Connecting to database...");
    let db = Database::connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    // Run migrations
    tracing::info!("Running migrations...");
    migration::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    // Wire up components; no ambient singletons, everything is
    // constructed here and handed out explicitly
    let feed = Arc::new(WikiFeedClient::new(
        config.feed_base_url.clone(),
        config.feed_timeout_secs,
        config.feed_accept_invalid_certs,
    ));
    let repo: Arc<dyn ItemRepository> = Arc::new(SeaOrmItemRepository::new(db.clone()));
    let marker = MarkerCache::new(Duration::from_secs(config.cache_ttl_secs));
    let sockets = Arc::new(SocketManager::new());
    let updater = Arc::new(PriceUpdater::new(
        feed,
        Arc::clone(&repo),
        marker,
        Arc::clone(&sockets),
    ));

    // Startup population: ingest the catalog, then run one price cycle,
    // which also arms the refresh marker. Failures are non-fatal; the
    // next cycle retries.
    if let Err(e) = updater.sync_item_mapping().await {
        tracing::error!("Startup mapping sync failed: {}", e);
    }
    updater.run_cycle().await;

    let mapping_job = start_mapping_sync_job(Arc::clone(&updater), config.mapping_sync_interval_secs);

    let state = AppState {
        db,
        repo,
        updater,
        sockets,
    };

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(
            config
                .cors_origins
                .iter()
                .filter_map(|o| o.parse::<HeaderValue>().ok()),
        ))
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = Router::new()
        .route("/", get(handlers::items::get_root))
        .route("/api/items", get(handlers::items::get_items))
        .route("/api/items/{id}", get(handlers::items::get_item))
        .route("/api/health", get(handlers::items::health_check))
        .route("/api/live", get(handlers::live_ws::live_ws))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .expect("Failed to bind listen port");

    tracing::info!("Server listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // Reap background work before exiting
    mapping_job.abort();
    let _ = mapping_job.await;

    tracing::info!("Backend shutdown complete");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
