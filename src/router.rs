//! Room router
//!
//! Turns connection events into registry changes and outbound messages.
//! Per connection the lifecycle is `Connected` → `Joined` → `Disconnected`;
//! a joined connection cannot go back to unjoined without reconnecting.
//!
//! Every handler returns the acknowledgement for the triggering connection.
//! Fan-out always walks a fresh snapshot of the room taken from the
//! registry at the moment of the broadcast.

use std::collections::HashMap;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::client::Client;
use crate::error::RelayError;
use crate::filter::ContentFilter;
use crate::format::{self, Clock, ADMIN_NAME};
use crate::message::{ClientEvent, RoomMember, ServerMessage};
use crate::presence::{PresenceRegistry, UserRecord};
use crate::types::{ClientId, RoomKey};

/// Default acknowledgement text for filtered messages
pub const DEFAULT_REJECTION: &str = "Profanity is not allowed!";

pub struct RoomRouter {
    /// Open connections: ClientId -> Client
    clients: HashMap<ClientId, Client>,
    presence: PresenceRegistry,
    filter: Box<dyn ContentFilter>,
    clock: Box<dyn Clock>,
    rejection_message: String,
}

impl RoomRouter {
    pub fn new(filter: Box<dyn ContentFilter>, clock: Box<dyn Clock>) -> Self {
        Self {
            clients: HashMap::new(),
            presence: PresenceRegistry::new(),
            filter,
            clock,
            rejection_message: DEFAULT_REJECTION.to_string(),
        }
    }

    /// Override the text sent back when the filter rejects a message
    pub fn with_rejection_message(mut self, message: impl Into<String>) -> Self {
        self.rejection_message = message.into();
        self
    }

    pub fn presence(&self) -> &PresenceRegistry {
        &self.presence
    }

    pub fn connection_count(&self) -> usize {
        self.clients.len()
    }

    /// Register a freshly opened connection (not yet joined)
    pub fn connect(&mut self, client_id: ClientId, sender: mpsc::Sender<ServerMessage>) {
        info!("Client {} connected", client_id);
        self.clients.insert(client_id, Client::new(client_id, sender));
        debug!(
            "Total connections: {}, Total rooms: {}",
            self.clients.len(),
            self.presence.room_count()
        );
    }

    /// Forget a connection, telling its room if it had joined one
    ///
    /// Disconnecting before a successful join is silent. Calling this twice
    /// for the same connection is a no-op the second time.
    pub fn disconnect(&mut self, client_id: ClientId) {
        if self.clients.remove(&client_id).is_some() {
            info!("Client {} disconnected", client_id);
        }
        self.leave_room(client_id);
        debug!(
            "Total connections: {}, Total rooms: {}",
            self.clients.len(),
            self.presence.room_count()
        );
    }

    /// Dispatch one inbound event
    pub fn handle_event(
        &mut self,
        client_id: ClientId,
        event: ClientEvent,
    ) -> Result<(), RelayError> {
        match event {
            ClientEvent::Join { username, room } => self.join(client_id, &username, &room),
            ClientEvent::SendMessage { text } => self.send_message(client_id, &text),
            ClientEvent::SendLocation {
                latitude,
                longitude,
            } => self.send_location(client_id, latitude, longitude),
            ClientEvent::Leave => {
                self.leave_room(client_id);
                Ok(())
            }
        }
    }

    /// Join a room under a display name
    ///
    /// On failure nothing is sent to anyone; the error is the
    /// acknowledgement. On success the joiner gets its welcome first, the
    /// rest of the room gets the join notice, then everyone (joiner
    /// included) gets the new member list.
    pub fn join(
        &mut self,
        client_id: ClientId,
        username: &str,
        room: &str,
    ) -> Result<(), RelayError> {
        if !self.clients.contains_key(&client_id) {
            debug!("Join from unknown connection {} ignored", client_id);
            return Ok(());
        }

        let user = self.presence.add_user(client_id, username, room)?;
        info!(
            "Client {} joined room {} as '{}'",
            client_id, user.room, user.username
        );

        self.send_to(
            client_id,
            format::text_message(self.clock.as_ref(), ADMIN_NAME, "Welcome!"),
        );
        self.broadcast(
            &user.room,
            format::text_message(
                self.clock.as_ref(),
                ADMIN_NAME,
                &format!("{} has joined the channel.", user.username),
            ),
            Some(client_id),
        );
        self.broadcast(&user.room, self.room_data(&user.room), None);

        Ok(())
    }

    /// Relay chat text to everyone in the sender's room, sender included
    ///
    /// A connection that has not joined has no room; the call succeeds
    /// without sending anything.
    pub fn send_message(&mut self, client_id: ClientId, text: &str) -> Result<(), RelayError> {
        let Some(user) = self.presence.get_user(client_id) else {
            debug!("Message from unjoined connection {} dropped", client_id);
            return Ok(());
        };

        if self.filter.check(text) {
            info!("Message from '{}' in {} rejected by filter", user.username, user.room);
            return Err(RelayError::ContentRejected(self.rejection_message.clone()));
        }

        self.broadcast(
            &user.room,
            format::text_message(self.clock.as_ref(), &user.username, text),
            None,
        );
        Ok(())
    }

    /// Share a location link with everyone in the sender's room
    pub fn send_location(
        &mut self,
        client_id: ClientId,
        latitude: f64,
        longitude: f64,
    ) -> Result<(), RelayError> {
        let Some(user) = self.presence.get_user(client_id) else {
            debug!("Location from unjoined connection {} dropped", client_id);
            return Ok(());
        };

        self.broadcast(
            &user.room,
            format::location_message(self.clock.as_ref(), &user.username, latitude, longitude),
            None,
        );
        Ok(())
    }

    /// Remove the connection's record and notify whoever is left
    fn leave_room(&mut self, client_id: ClientId) -> Option<UserRecord> {
        let user = self.presence.remove_user(client_id)?;
        info!(
            "Client {} ('{}') left room {}",
            client_id, user.username, user.room
        );

        self.broadcast(
            &user.room,
            format::text_message(
                self.clock.as_ref(),
                ADMIN_NAME,
                &format!("{} has left.", user.username),
            ),
            None,
        );
        self.broadcast(&user.room, self.room_data(&user.room), None);

        Some(user)
    }

    fn room_data(&self, room: &RoomKey) -> ServerMessage {
        ServerMessage::RoomData {
            room: room.to_string(),
            users: self
                .presence
                .members_of(room)
                .into_iter()
                .map(|u| RoomMember {
                    username: u.username,
                })
                .collect(),
        }
    }

    /// Fan a message out over a snapshot of the room, optionally skipping one
    fn broadcast(&self, room: &RoomKey, msg: ServerMessage, except: Option<ClientId>) {
        let targets: Vec<ClientId> = self
            .presence
            .members_of(room)
            .into_iter()
            .map(|u| u.client_id)
            .filter(|id| Some(*id) != except)
            .collect();

        for id in targets {
            self.send_to(id, msg.clone());
        }
    }

    fn send_to(&self, client_id: ClientId, msg: ServerMessage) {
        let Some(client) = self.clients.get(&client_id) else {
            debug!("No open connection for {}", client_id);
            return;
        };
        if let Err(e) = client.deliver(msg) {
            warn!("Dropped message for {}: {}", client_id, e);
        }
    }
}
