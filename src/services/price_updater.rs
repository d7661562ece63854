//! Update orchestrator
//!
//! Runs the fetch -> diff -> persist -> notify -> re-arm cycle. All
//! entry paths funnel through one gate so concurrent triggers collapse
//! into a single cycle, and the refresh marker is re-armed on every
//! outcome so the cadence survives upstream failures.

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::services::feed::PriceFeed;
use crate::services::marker_cache::MarkerCache;
use crate::services::price_diff::detect_price_changes;
use crate::services::repository::ItemRepository;
use crate::services::socket_manager::SocketManager;

pub struct PriceUpdater {
    feed: Arc<dyn PriceFeed>,
    repo: Arc<dyn ItemRepository>,
    marker: MarkerCache,
    sockets: Arc<SocketManager>,
    /// Held for the whole cycle; protects the decision to run, not the
    /// individual repository calls
    update_gate: Mutex<()>,
}

impl PriceUpdater {
    pub fn new(
        feed: Arc<dyn PriceFeed>,
        repo: Arc<dyn ItemRepository>,
        marker: MarkerCache,
        sockets: Arc<SocketManager>,
    ) -> Self {
        Self {
            feed,
            repo,
            marker,
            sockets,
            update_gate: Mutex::new(()),
        }
    }

    pub fn marker(&self) -> &MarkerCache {
        &self.marker
    }

    /// Passive trigger: refresh only if the marker has expired.
    ///
    /// A trigger that loses the race blocks on the gate, then re-checks
    /// the marker and backs off, since the winning cycle re-armed it.
    pub async fn ensure_fresh(&self) {
        if self.marker.is_armed().await {
            return;
        }

        let _guard = self.update_gate.lock().await;

        if self.marker.is_armed().await {
            return;
        }

        info!("Refresh marker expired - starting price update cycle");
        self.run_locked_cycle().await;
    }

    /// Run one full cycle unconditionally (startup population, tests).
    /// Serializes through the same gate as `ensure_fresh`.
    pub async fn run_cycle(&self) {
        let _guard = self.update_gate.lock().await;
        self.run_locked_cycle().await;
    }

    /// Fire-and-forget passive check from a read request. Errors never
    /// reach the spawning request; the cycle logs its own failures.
    pub fn spawn_check(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            self.ensure_fresh().await;
        })
    }

    /// Fetch the item catalog and upsert it. Run at startup and from
    /// the periodic mapping sync job.
    pub async fn sync_item_mapping(
        &self,
    ) -> Result<usize, Box<dyn std::error::Error + Send + Sync>> {
        let mappings = self.feed.fetch_mapping().await?;
        let count = mappings.len();
        self.repo.upsert_items(mappings).await?;
        info!("Stored {} items from mapping feed", count);
        Ok(count)
    }

    /// Caller must hold `update_gate`. Never returns an error and
    /// re-arms the marker on every path.
    async fn run_locked_cycle(&self) {
        if let Err(e) = self.update_from_feed().await {
            error!("Price update cycle failed: {}", e);
        }

        // Guaranteed re-arm: success, no-op and failure all retry on
        // the next natural interval
        self.marker.arm().await;
    }

    async fn update_from_feed(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let latest = self.feed.fetch_latest().await?;

        if latest.is_empty() {
            warn!("No data from price feed");
            return Ok(());
        }

        let current = self.repo.current_prices().await?;
        let mut changed = detect_price_changes(&current, &latest);

        if changed.is_empty() {
            info!("No price changes detected");
            return Ok(());
        }

        info!(
            "Detected changes in {}/{} items",
            changed.len(),
            latest.len()
        );

        // The feed reports items outside the tracked catalog; drop them
        // instead of tripping the foreign key
        let valid_ids = self.repo.valid_item_ids().await?;
        let before = changed.len();
        changed.retain(|id, _| valid_ids.contains(id));
        let filtered = before - changed.len();

        if filtered > 0 {
            info!("Filtered out {} items not in our catalog", filtered);
        }

        if changed.is_empty() {
            warn!("No valid items to update prices for");
            return Ok(());
        }

        self.repo.apply_price_updates(&changed).await?;
        info!("Updated prices for {} items", changed.len());

        let mut updated_ids: Vec<i32> = changed.keys().copied().collect();
        updated_ids.sort_unstable();
        self.sockets.notify_price_updates(&updated_ids);

        Ok(())
    }
}
