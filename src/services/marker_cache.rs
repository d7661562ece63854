//! Refresh marker over a TTL cache
//!
//! A single timed token whose presence means "no refresh owed". The
//! marker is armed at startup and re-armed after every update cycle,
//! success or failure, so the refresh cadence is bounded even when the
//! upstream feed stays down. Read handlers check it passively and
//! schedule a refresh when it has expired.

use moka::future::Cache;
use std::time::Duration;

const MARKER_KEY: &str = "items_fresh";

#[derive(Clone)]
pub struct MarkerCache {
    cache: Cache<&'static str, ()>,
    ttl: Duration,
}

impl MarkerCache {
    pub fn new(ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(1)
            .time_to_live(ttl)
            .build();

        Self { cache, ttl }
    }

    /// True while the marker has not expired (no refresh owed)
    pub async fn is_armed(&self) -> bool {
        self.cache.get(&MARKER_KEY).await.is_some()
    }

    /// Reset the marker with a fresh TTL
    pub async fn arm(&self) {
        self.cache.insert(MARKER_KEY, ()).await;
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}
