//! Item mapping sync job
//!
//! Re-ingests the upstream item catalog on a slow cadence (default 24
//! hours) so newly released items become visible without a restart.
//! The initial sync happens during startup, before the server begins
//! accepting traffic; this job only covers the repeats.

use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration};
use tracing::{error, info};

use crate::services::price_updater::PriceUpdater;

pub fn start_mapping_sync_job(
    updater: Arc<PriceUpdater>,
    interval_secs: u64,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = interval(Duration::from_secs(interval_secs));
        // The first tick fires immediately; startup already synced
        interval.tick().await;

        loop {
            interval.tick().await;
            info!("Starting scheduled item mapping sync");

            match updater.sync_item_mapping().await {
                Ok(count) => info!("Mapping sync complete, {} items upserted", count),
                Err(e) => error!("Mapping sync failed: {}", e),
            }
        }
    })
}
