//! Shared test doubles for driving the update cycle without a live
//! database or feed: a stub feed with a call counter and an in-memory
//! repository that enforces the same referential rule as the real one.

// Not every test binary uses every helper
#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use osrs_price_tracker::models::item::ItemWithPrice;
use osrs_price_tracker::services::feed::{ItemMapping, PriceFeed, PriceQuote};
use osrs_price_tracker::services::marker_cache::MarkerCache;
use osrs_price_tracker::services::price_updater::PriceUpdater;
use osrs_price_tracker::services::repository::{CurrentPrice, ItemRepository};
use osrs_price_tracker::services::socket_manager::SocketManager;

#[derive(Default)]
pub struct StubFeed {
    pub snapshot: Mutex<HashMap<i32, PriceQuote>>,
    pub mapping: Mutex<Vec<ItemMapping>>,
    pub fetch_calls: AtomicUsize,
    pub fail: AtomicBool,
    /// Widens the race window for single-flight tests
    pub fetch_delay: Option<Duration>,
}

impl StubFeed {
    pub fn with_snapshot(snapshot: HashMap<i32, PriceQuote>) -> Self {
        Self {
            snapshot: Mutex::new(snapshot),
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        let feed = Self::default();
        feed.fail.store(true, Ordering::SeqCst);
        feed
    }
}

#[async_trait]
impl PriceFeed for StubFeed {
    async fn fetch_latest(
        &self,
    ) -> Result<HashMap<i32, PriceQuote>, Box<dyn std::error::Error + Send + Sync>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.fetch_delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail.load(Ordering::SeqCst) {
            return Err("stub feed unreachable".into());
        }

        Ok(self.snapshot.lock().clone())
    }

    async fn fetch_mapping(
        &self,
    ) -> Result<Vec<ItemMapping>, Box<dyn std::error::Error + Send + Sync>> {
        if self.fail.load(Ordering::SeqCst) {
            return Err("stub feed unreachable".into());
        }
        Ok(self.mapping.lock().clone())
    }
}

#[derive(Default)]
pub struct MemoryRepository {
    pub items: Mutex<HashMap<i32, ItemMapping>>,
    pub prices: Mutex<HashMap<i32, CurrentPrice>>,
    pub write_calls: AtomicUsize,
}

impl MemoryRepository {
    pub fn seeded(items: Vec<ItemMapping>) -> Self {
        let repo = Self::default();
        {
            let mut map = repo.items.lock();
            for item in items {
                map.insert(item.id, item);
            }
        }
        repo
    }

    fn to_item_with_price(item: &ItemMapping, price: Option<&CurrentPrice>) -> ItemWithPrice {
        ItemWithPrice {
            id: item.id,
            name: item.name.clone(),
            examine: item.examine.clone(),
            members: item.members,
            lowalch: item.lowalch,
            highalch: item.highalch,
            limit_value: item.limit_value,
            value: item.value,
            icon: item.icon.clone(),
            high_price: price.and_then(|p| p.high_price),
            high_time: price.and_then(|p| p.high_time),
            low_price: price.and_then(|p| p.low_price),
            low_time: price.and_then(|p| p.low_time),
            price_last_updated: None,
        }
    }
}

#[async_trait]
impl ItemRepository for MemoryRepository {
    async fn upsert_items(
        &self,
        mappings: Vec<ItemMapping>,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut items = self.items.lock();
        for mapping in mappings {
            items.insert(mapping.id, mapping);
        }
        Ok(())
    }

    async fn all_with_prices(
        &self,
    ) -> Result<Vec<ItemWithPrice>, Box<dyn std::error::Error + Send + Sync>> {
        let items = self.items.lock();
        let prices = self.prices.lock();

        let mut rows: Vec<ItemWithPrice> = items
            .values()
            .map(|item| Self::to_item_with_price(item, prices.get(&item.id)))
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn one_with_price(
        &self,
        id: i32,
    ) -> Result<Option<ItemWithPrice>, Box<dyn std::error::Error + Send + Sync>> {
        let items = self.items.lock();
        let prices = self.prices.lock();
        Ok(items
            .get(&id)
            .map(|item| Self::to_item_with_price(item, prices.get(&id))))
    }

    async fn current_prices(
        &self,
    ) -> Result<HashMap<i32, CurrentPrice>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.prices.lock().clone())
    }

    async fn valid_item_ids(
        &self,
    ) -> Result<HashSet<i32>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.items.lock().keys().copied().collect())
    }

    async fn apply_price_updates(
        &self,
        changes: &HashMap<i32, PriceQuote>,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);

        let items = self.items.lock();
        let mut prices = self.prices.lock();

        for (item_id, quote) in changes {
            // Same rule the real schema enforces with a foreign key
            if !items.contains_key(item_id) {
                return Err(format!("foreign key violation for item {}", item_id).into());
            }
            prices.insert(
                *item_id,
                CurrentPrice {
                    item_id: *item_id,
                    high_price: quote.high,
                    high_time: quote.high_time,
                    low_price: quote.low,
                    low_time: quote.low_time,
                },
            );
        }
        Ok(())
    }
}

pub fn item(id: i32, name: &str) -> ItemMapping {
    ItemMapping {
        id,
        name: name.to_string(),
        examine: None,
        members: false,
        lowalch: None,
        highalch: None,
        limit_value: None,
        value: None,
        icon: None,
    }
}

pub fn quote(high: i64, high_time: i64, low: i64, low_time: i64) -> PriceQuote {
    PriceQuote {
        high: Some(high),
        high_time: Some(high_time),
        low: Some(low),
        low_time: Some(low_time),
    }
}

/// Wire an updater from stubs with a fresh marker and socket manager
pub fn build_updater(
    feed: Arc<StubFeed>,
    repo: Arc<MemoryRepository>,
    ttl: Duration,
) -> (Arc<PriceUpdater>, Arc<SocketManager>) {
    let sockets = Arc::new(SocketManager::new());
    let updater = Arc::new(PriceUpdater::new(
        feed,
        repo,
        MarkerCache::new(ttl),
        Arc::clone(&sockets),
    ));
    (updater, sockets)
}
