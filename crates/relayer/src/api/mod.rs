//! HTTP and WebSocket surface.

mod routes;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::relay::Hub;

/// Shared app state.
#[derive(Clone)]
pub struct AppState {
    pub hub: Arc<Hub>,
    pub config: Arc<Config>,
}

/// Only the exact `/publisher` and `/subscriber` paths upgrade; anything else
/// falls through to a 404 without touching the hub.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/stats", get(routes::stats))
        .route("/publisher", get(routes::publisher_ws))
        .route("/subscriber", get(routes::subscriber_ws))
        .fallback(routes::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
