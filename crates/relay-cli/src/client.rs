//! WebSocket client for publishing to and subscribing from the relayer.

use anyhow::Result;
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use shared::{codec, Envelope};

/// Interpret one input line. Valid JSON is sent as-is, anything else as a
/// JSON string. Blank lines are skipped.
pub fn parse_line(line: &str) -> Option<Value> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    Some(serde_json::from_str(line).unwrap_or_else(|_| Value::String(line.to_string())))
}

/// Values carried by one subscriber frame, oldest first.
pub fn frame_values(text: &str) -> Vec<Value> {
    match codec::decode(text) {
        Ok(Envelope::PostData(value)) => vec![value],
        Ok(Envelope::History(data)) => data,
        Ok(Envelope::Other(kind)) => {
            tracing::debug!(kind, "ignoring frame");
            Vec::new()
        }
        Err(e) => {
            tracing::warn!("Undecodable frame: {}", e);
            Vec::new()
        }
    }
}

/// Publish every line of `input` until EOF. Returns the number of values sent.
pub async fn run_publisher<R>(url: &str, input: R) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let (ws, _) = connect_async(url).await?;
    tracing::info!("Connected to relayer as publisher");
    let (mut ws_tx, mut ws_rx) = ws.split();

    // Drain inbound so pings get answered.
    let reader = tokio::spawn(async move { while let Some(Ok(_)) = ws_rx.next().await {} });

    let mut lines = input.lines();
    let mut sent = 0;
    while let Some(line) = lines.next_line().await? {
        let Some(value) = parse_line(&line) else {
            continue;
        };
        ws_tx
            .send(Message::Text(codec::encode_post_data(&value)?))
            .await?;
        sent += 1;
    }

    ws_tx.send(Message::Close(None)).await.ok();
    reader.abort();
    Ok(sent)
}

/// Write received values to `out`, optionally reconnecting every 5s.
pub async fn run_subscriber<W>(url: &str, reconnect: bool, mut out: W) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    loop {
        match connect_async(url).await {
            Ok((ws, _)) => {
                tracing::info!("Connected to relayer as subscriber");
                if let Err(e) = handle_subscription(ws, &mut out).await {
                    tracing::warn!("Connection error: {}", e);
                }
            }
            Err(e) if reconnect => {
                tracing::warn!("Connect failed: {}, retrying in 5s", e);
            }
            Err(e) => return Err(e.into()),
        }
        if !reconnect {
            return Ok(());
        }
        tokio::time::sleep(tokio::time::Duration::from_secs(5)).await;
    }
}

async fn handle_subscription<W>(
    ws: tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >,
    out: &mut W,
) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let (_, mut ws_rx) = ws.split();
    while let Some(msg) = ws_rx.next().await {
        let text = match msg {
            Ok(Message::Text(t)) => t,
            Ok(Message::Close(_)) => break,
            Err(e) => return Err(e.into()),
            _ => continue,
        };
        for value in frame_values(&text) {
            let mut line = serde_json::to_string(&value)?;
            line.push('\n');
            out.write_all(line.as_bytes()).await?;
        }
        out.flush().await?;
    }
    Ok(())
}
