//! WebSocket handler for live price update notifications
//!
//! Clients connect to GET /api/live and receive a `price_update`
//! message whenever an update cycle changes prices. Membership in the
//! subscriber set lasts exactly as long as the connection. A text
//! `ping` gets a `pong` back as a liveness probe.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::services::socket_manager::SocketManager;
use crate::AppState;

pub async fn live_ws(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    let sockets = Arc::clone(&state.sockets);
    ws.on_upgrade(move |socket| handle_socket(socket, sockets))
}

async fn handle_socket(socket: WebSocket, sockets: Arc<SocketManager>) {
    let (client_id, mut updates) = sockets.connect();
    let (mut sender, mut receiver) = socket.split();

    let greeting = serde_json::json!({
        "type": "connected",
        "message": "Connected to OSRS live price updates",
        "timestamp": Utc::now(),
    });

    if sender
        .send(Message::Text(greeting.to_string().into()))
        .await
        .is_err()
    {
        sockets.disconnect(client_id);
        return;
    }

    loop {
        tokio::select! {
            update = updates.recv() => {
                match update {
                    Ok(message) => {
                        let payload = match serde_json::to_string(&message) {
                            Ok(payload) => payload,
                            Err(e) => {
                                warn!("Failed to serialize price update: {}", e);
                                continue;
                            }
                        };
                        if sender.send(Message::Text(payload.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        // Best-effort delivery; a slow client just misses them
                        debug!("Client {} lagged, skipped {} updates", client_id, skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            incoming = receiver.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) if text.as_str().trim() == "ping" => {
                        let pong = serde_json::json!({
                            "type": "pong",
                            "timestamp": Utc::now(),
                        });
                        if sender.send(Message::Text(pong.to_string().into())).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        debug!("Client {} socket error: {}", client_id, e);
                        break;
                    }
                }
            }
        }
    }

    sockets.disconnect(client_id);
}
