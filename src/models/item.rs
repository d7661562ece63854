//! Request/response models for the item endpoints

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One item joined with its current price row (price fields null when the
/// item has no price record yet)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemWithPrice {
    pub id: i32,
    pub name: String,
    pub examine: Option<String>,
    pub members: bool,
    pub lowalch: Option<i32>,
    pub highalch: Option<i32>,
    pub limit_value: Option<i32>,
    pub value: Option<i32>,
    pub icon: Option<String>,
    pub high_price: Option<i64>,
    pub high_time: Option<i64>,
    pub low_price: Option<i64>,
    pub low_time: Option<i64>,
    pub price_last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemsResponse {
    pub items: Vec<ItemWithPrice>,
    pub count: usize,
    pub timestamp: DateTime<Utc>,
    pub source: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
    pub cache: String,
    pub connected_clients: usize,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
