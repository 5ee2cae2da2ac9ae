//! Room-based WebSocket Chat Relay Library
//!
//! A WebSocket chat relay built with tokio-tungstenite using the Actor
//! pattern for state management.
//!
//! # Features
//! - WebSocket connection handling with per-event acknowledgements
//! - Joining a named room under a display name unique within that room
//! - Text and location messages broadcast to the whole room
//! - Live member list (`roomData`) on every join and leave
//! - Word-list content filtering
//!
//! # Architecture
//! Uses the Actor pattern with `mpsc` channels:
//! - `ChatServer` is the central actor; it owns the `RoomRouter`, which
//!   owns the `PresenceRegistry`
//! - Each connection has a `handler` task communicating with the server
//! - No locks needed - all state access goes through message passing
//!
//! # Example
//! ```ignore
//! use tokio::net::TcpListener;
//! use tokio::sync::mpsc;
//! use room_relay::{serve, AllowAll, ChatServer, RoomRouter, SystemClock};
//!
//! #[tokio::main]
//! async fn main() {
//!     let listener = TcpListener::bind("127.0.0.1:8080").await.unwrap();
//!     let (cmd_tx, cmd_rx) = mpsc::channel(256);
//!     let router = RoomRouter::new(Box::new(AllowAll), Box::new(SystemClock));
//!
//!     tokio::spawn(ChatServer::new(router, cmd_rx).run());
//!     serve(listener, cmd_tx, 64).await;
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod filter;
pub mod format;
pub mod handler;
pub mod message;
pub mod presence;
pub mod router;
pub mod server;
pub mod types;

// Re-export main types for convenience
pub use client::Client;
pub use config::Config;
pub use error::{AppError, RelayError, SendError};
pub use filter::{AllowAll, ContentFilter, WordFilter};
pub use format::{Clock, SystemClock};
pub use handler::{handle_connection, serve};
pub use message::{ClientEvent, ClientFrame, RoomMember, ServerMessage};
pub use presence::{PresenceRegistry, UserRecord};
pub use router::RoomRouter;
pub use server::{dispatch, ChatServer, ServerCommand};
pub use types::{ClientId, RoomKey};
