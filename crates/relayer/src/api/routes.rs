//! WebSocket connection handlers.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::api::AppState;
use crate::relay::{Frame, Hub, HubStats, IngestError};

pub async fn stats(State(state): State<AppState>) -> Json<HubStats> {
    Json(state.hub.stats())
}

pub async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "not found").into_response()
}

pub async fn publisher_ws(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_publisher(socket, state.hub))
}

pub async fn subscriber_ws(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let ping_interval = state.config.ping_interval;
    ws.on_upgrade(move |socket| handle_subscriber(socket, state.hub, ping_interval))
}

/// Feed text frames into the hub until the connection closes.
async fn handle_publisher(mut socket: WebSocket, hub: Arc<Hub>) {
    let id = hub.register_publisher();

    while let Some(msg) = socket.recv().await {
        match msg {
            Ok(Message::Text(text)) => match hub.ingest_publish(id, text) {
                Ok(delivered) => debug!(publisher = %id, delivered, "broadcast"),
                Err(IngestError::StalePublisher(_)) => {
                    debug!(publisher = %id, "dropping frame from displaced publisher")
                }
                Err(e) => warn!(publisher = %id, error = %e, "dropping publisher message"),
            },
            Ok(Message::Binary(_)) => debug!(publisher = %id, "ignoring binary frame"),
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                debug!(publisher = %id, error = %e, "publisher socket error");
                break;
            }
        }
    }

    hub.unregister_publisher(id);
}

/// Register, then forward queued frames from a writer task while the read half
/// waits for the close.
async fn handle_subscriber(socket: WebSocket, hub: Arc<Hub>, ping_interval: Duration) {
    let (tx, mut rx) = mpsc::unbounded_channel::<Frame>();
    let id = hub.register_subscriber(tx);
    let (mut ws_tx, mut ws_rx) = socket.split();

    let mut ping = tokio::time::interval(ping_interval);
    ping.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let writer = tokio::spawn(async move {
        loop {
            tokio::select! {
                frame = rx.recv() => {
                    let Some(frame) = frame else { break };
                    if ws_tx.send(Message::Text(frame)).await.is_err() {
                        break;
                    }
                }
                _ = ping.tick() => {
                    if ws_tx.send(Message::Ping(axum::body::Bytes::new())).await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    while let Some(msg) = ws_rx.next().await {
        match msg {
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                debug!(subscriber = %id, error = %e, "subscriber socket error");
                break;
            }
        }
    }

    hub.unregister_subscriber(id);
    writer.abort();
}
