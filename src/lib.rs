// src/lib.rs

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use services::price_updater::PriceUpdater;
use services::repository::ItemRepository;
use services::socket_manager::SocketManager;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub repo: Arc<dyn ItemRepository>,
    pub updater: Arc<PriceUpdater>,
    pub sockets: Arc<SocketManager>,
}

pub mod entities {
    pub mod items;
    pub mod prices;
}

pub mod services {
    pub mod feed;
    pub mod marker_cache;
    pub mod price_diff;
    pub mod price_updater;
    pub mod repository;
    pub mod socket_manager;
}

pub mod handlers {
    pub mod items;
    pub mod live_ws;
}

pub mod jobs {
    pub mod mapping_sync;
}

pub mod models {
    pub mod item;
}

pub mod config;
