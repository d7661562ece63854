//! Price feed client for the runescape.wiki OSRS API
//!
//! Two endpoints: `/latest` (current high/low quotes keyed by item id)
//! and `/mapping` (static item catalog). Both are bounded by the
//! configured timeout; a timeout or bad status is an ordinary error
//! that the update cycle treats as a failed fetch.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// One two-sided quote from the snapshot feed. Times are unix seconds
/// of the last trade on each side; either side can be missing for
/// thinly traded items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub high: Option<i64>,
    #[serde(rename = "highTime")]
    pub high_time: Option<i64>,
    pub low: Option<i64>,
    #[serde(rename = "lowTime")]
    pub low_time: Option<i64>,
}

/// One catalog entry from the mapping feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemMapping {
    pub id: i32,
    pub name: String,
    pub examine: Option<String>,
    #[serde(default)]
    pub members: bool,
    pub lowalch: Option<i32>,
    pub highalch: Option<i32>,
    #[serde(rename = "limit")]
    pub limit_value: Option<i32>,
    pub value: Option<i32>,
    pub icon: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LatestResponse {
    #[serde(default)]
    data: HashMap<i32, PriceQuote>,
}

/// Upstream price source. Behind a trait so the update cycle can be
/// driven by a stub in tests.
#[async_trait]
pub trait PriceFeed: Send + Sync {
    /// Fetch the latest snapshot of all item quotes, keyed by item id
    async fn fetch_latest(
        &self,
    ) -> Result<HashMap<i32, PriceQuote>, Box<dyn std::error::Error + Send + Sync>>;

    /// Fetch the full item catalog
    async fn fetch_mapping(
        &self,
    ) -> Result<Vec<ItemMapping>, Box<dyn std::error::Error + Send + Sync>>;
}

#[derive(Clone)]
pub struct WikiFeedClient {
    client: Client,
    base_url: String,
}

impl WikiFeedClient {
    pub fn new(base_url: String, timeout_secs: u64, accept_invalid_certs: bool) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            // The wiki API rejects requests without an identifying UA
            .user_agent("osrs-price-tracker/0.1")
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()
            .expect("failed to build feed HTTP client");

        Self { client, base_url }
    }
}

#[async_trait]
impl PriceFeed for WikiFeedClient {
    async fn fetch_latest(
        &self,
    ) -> Result<HashMap<i32, PriceQuote>, Box<dyn std::error::Error + Send + Sync>> {
        let url = format!("{}/latest", self.base_url);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(format!("price feed returned status {}", response.status()).into());
        }

        let body: LatestResponse = response.json().await?;
        Ok(body.data)
    }

    async fn fetch_mapping(
        &self,
    ) -> Result<Vec<ItemMapping>, Box<dyn std::error::Error + Send + Sync>> {
        let url = format!("{}/mapping", self.base_url);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(format!("mapping feed returned status {}", response.status()).into());
        }

        let items: Vec<ItemMapping> = response.json().await?;
        Ok(items)
    }
}
