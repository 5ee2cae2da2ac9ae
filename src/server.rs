//! ChatServer Actor implementation
//!
//! The central actor that owns the room router and, through it, the
//! presence registry. Commands arrive over an mpsc channel and are applied
//! one at a time, so every registry operation is atomic with respect to
//! every other.

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use crate::error::RelayError;
use crate::message::{ClientEvent, ServerMessage};
use crate::router::RoomRouter;
use crate::types::ClientId;

/// Commands sent from connection handlers to the ChatServer actor
#[derive(Debug)]
pub enum ServerCommand {
    /// New connection opened
    Connect {
        client_id: ClientId,
        sender: mpsc::Sender<ServerMessage>,
    },
    /// Connection closed
    Disconnect { client_id: ClientId },
    /// Inbound event; the handler result is sent back on `reply`
    Event {
        client_id: ClientId,
        event: ClientEvent,
        reply: oneshot::Sender<Result<(), RelayError>>,
    },
}

/// The main ChatServer actor
pub struct ChatServer {
    router: RoomRouter,
    /// Command receiver channel
    receiver: mpsc::Receiver<ServerCommand>,
}

impl ChatServer {
    /// Create a new ChatServer with the given router and command receiver
    pub fn new(router: RoomRouter, receiver: mpsc::Receiver<ServerCommand>) -> Self {
        Self { router, receiver }
    }

    /// Run the ChatServer event loop
    ///
    /// Continuously receives and processes commands until all senders are dropped.
    pub async fn run(mut self) {
        info!("ChatServer started");

        while let Some(cmd) = self.receiver.recv().await {
            self.handle_command(cmd);
        }

        info!("ChatServer shutting down");
    }

    /// Process a single command
    fn handle_command(&mut self, cmd: ServerCommand) {
        match cmd {
            ServerCommand::Connect { client_id, sender } => {
                self.router.connect(client_id, sender);
            }
            ServerCommand::Disconnect { client_id } => {
                self.router.disconnect(client_id);
            }
            ServerCommand::Event {
                client_id,
                event,
                reply,
            } => {
                debug!("Event from {}: {:?}", client_id, event);
                let result = self.router.handle_event(client_id, event);
                if reply.send(result).is_err() {
                    debug!("Client {} went away before its acknowledgement", client_id);
                }
            }
        }
    }
}

/// Submit an event to the actor and wait for its acknowledgement
///
/// Returns `None` if the actor is gone.
pub async fn dispatch(
    cmd_tx: &mpsc::Sender<ServerCommand>,
    client_id: ClientId,
    event: ClientEvent,
) -> Option<Result<(), RelayError>> {
    let (reply, rx) = oneshot::channel();
    cmd_tx
        .send(ServerCommand::Event {
            client_id,
            event,
            reply,
        })
        .await
        .ok()?;
    rx.await.ok()
}
