//! Relayer: HTTP + WebSocket server.
//!
//! Optional env: HOST, PORT, HISTORY_SIZE, PING_INTERVAL_SECS, RUST_LOG

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use relayer::{api, config, relay};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("relayer=info,tower_http=info")),
        )
        .init();

    let config = config::Config::from_env().map_err(|e| anyhow::anyhow!("config: {}", e))?;
    let config = Arc::new(config);

    let hub = Arc::new(relay::Hub::new(config.history_size));
    let state = api::AppState {
        hub,
        config: config.clone(),
    };
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    tracing::info!(
        addr = %listener.local_addr()?,
        history_size = config.history_size,
        "Relayer listening"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
