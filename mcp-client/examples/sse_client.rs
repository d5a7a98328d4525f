use anyhow::Result;
use mcp_client::mcp_protocol::{constants::methods, JsonRpcMessage, PROTOCOL_VERSION};
use mcp_client::{SseClientTransport, Transport};
use serde_json::json;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "http://localhost:3000/sse".to_string());
    info!("Connecting to {}", url);

    let transport = SseClientTransport::builder(&url)
        .reconnection_time(Duration::from_secs(3))
        .build()?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    transport.callbacks().on_message(move |message| {
        let _ = tx.send(message);
    });
    transport.callbacks().on_error(|err| {
        info!("Transport reported: {}", err);
    });
    transport.callbacks().on_close(|| info!("Transport closed"));

    transport.start().await?;
    info!("Posting to {:?}", transport.endpoint());

    transport
        .send(JsonRpcMessage::request(
            1,
            methods::INITIALIZE,
            Some(json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {},
                "clientInfo": {"name": "sse-client", "version": "0.1.0"}
            })),
        ))
        .await?;

    match tokio::time::timeout(Duration::from_secs(10), rx.recv()).await {
        Ok(Some(response)) => info!("Received: {:?}", response),
        Ok(None) => info!("Stream ended without a response"),
        Err(_) => info!("Timed out waiting for a response"),
    }

    transport
        .send(JsonRpcMessage::notification(methods::INITIALIZED, None))
        .await?;

    // Shutdown
    info!("Shutting down client");
    transport.close().await?;

    Ok(())
}
