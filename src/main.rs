//! Room Relay - Entry Point
//!
//! Loads configuration, starts the ChatServer actor and accepts connections.
//!
//! ```bash
//! # Defaults, or ./relay.toml if present
//! room_relay
//!
//! # Explicit bind address
//! room_relay 0.0.0.0:9000
//!
//! # Environment
//! RELAY_CONFIG=/etc/relay.toml RUST_LOG=room_relay=debug room_relay
//! ```

use std::env;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use room_relay::{serve, ChatServer, Config, RoomRouter, SystemClock};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Use RUST_LOG env var to control log level
    // e.g., RUST_LOG=debug or RUST_LOG=room_relay=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("room_relay=info")),
        )
        .init();

    let config = Config::load()?;

    // Bind address from command line overrides the config
    let addr = env::args().nth(1).unwrap_or_else(|| config.bind_addr());

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Room relay listening on {}", addr);

    let router = RoomRouter::new(config.filter.build(), Box::new(SystemClock))
        .with_rejection_message(config.filter.rejection_message.clone());
    let (cmd_tx, cmd_rx) = mpsc::channel(config.command_buffer);
    tokio::spawn(ChatServer::new(router, cmd_rx).run());

    info!("ChatServer actor started");

    serve(listener, cmd_tx, config.client_buffer).await;

    Ok(())
}
