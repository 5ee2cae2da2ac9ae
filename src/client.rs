//! Client struct definition
//!
//! Outbound handle for one live connection.

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::error::SendError;
use crate::message::ServerMessage;
use crate::types::ClientId;

/// Connected client handle
///
/// Holds the connection's identity and its Server → Client queue. Identity
/// data (name, room) lives in the presence registry, not here.
#[derive(Debug, Clone)]
pub struct Client {
    /// Unique identifier for this connection
    pub id: ClientId,
    /// Server → Client message channel
    pub sender: mpsc::Sender<ServerMessage>,
}

impl Client {
    /// Create a new client with the given ID and sender channel
    pub fn new(id: ClientId, sender: mpsc::Sender<ServerMessage>) -> Self {
        Self { id, sender }
    }

    /// Queue a message for this client without waiting
    ///
    /// Delivery is best-effort: a full or closed queue drops the message
    /// for this client only.
    pub fn deliver(&self, msg: ServerMessage) -> Result<(), SendError> {
        self.sender.try_send(msg).map_err(|e| match e {
            TrySendError::Full(_) => SendError::ChannelFull,
            TrySendError::Closed(_) => SendError::ChannelClosed,
        })
    }
}
