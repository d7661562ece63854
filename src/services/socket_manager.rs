//! WebSocket fan-out for price update notifications
//!
//! Tracks connected clients as a plain id set and broadcasts one
//! `price_update` message per cycle over a tokio broadcast channel.
//! Delivery is best-effort: no acks, no retries, slow receivers that
//! lag the channel simply miss messages.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tracing::info;

/// Payload pushed to every connected client when prices change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceUpdateMessage {
    #[serde(rename = "type")]
    pub kind: String,
    pub updated_items: Vec<String>,
    pub count: usize,
    pub timestamp: DateTime<Utc>,
}

pub struct SocketManager {
    clients: RwLock<HashSet<u64>>,
    next_id: AtomicU64,
    update_tx: broadcast::Sender<PriceUpdateMessage>,
}

impl SocketManager {
    pub fn new() -> Self {
        let (update_tx, _) = broadcast::channel(64);
        Self {
            clients: RwLock::new(HashSet::new()),
            next_id: AtomicU64::new(1),
            update_tx,
        }
    }

    /// Register a new client; returns its id and a receiver for update
    /// broadcasts
    pub fn connect(&self) -> (u64, broadcast::Receiver<PriceUpdateMessage>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.clients.write().insert(id);
        info!(
            "Client {} connected. Total: {}",
            id,
            self.connected_clients()
        );
        (id, self.update_tx.subscribe())
    }

    pub fn disconnect(&self, id: u64) {
        self.clients.write().remove(&id);
        info!(
            "Client {} disconnected. Total: {}",
            id,
            self.connected_clients()
        );
    }

    pub fn connected_clients(&self) -> usize {
        self.clients.read().len()
    }

    /// Broadcast one message listing the changed item ids. No-op when
    /// nobody is connected.
    pub fn notify_price_updates(&self, updated_item_ids: &[i32]) {
        if self.clients.read().is_empty() {
            return;
        }

        let message = PriceUpdateMessage {
            kind: "price_update".to_string(),
            updated_items: updated_item_ids.iter().map(|id| id.to_string()).collect(),
            count: updated_item_ids.len(),
            timestamp: Utc::now(),
        };

        // A send error only means every receiver dropped between the
        // membership check and here; fine for best-effort delivery
        let _ = self.update_tx.send(message);

        info!(
            "Notified {} clients about {} price updates",
            self.connected_clients(),
            updated_item_ids.len()
        );
    }
}

impl Default for SocketManager {
    fn default() -> Self {
        Self::new()
    }
}
