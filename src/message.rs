//! Message protocol definitions
//!
//! JSON-based bidirectional message protocol using Serde's tagged enum
//! for type-safe serialization/deserialization. Event names and payload
//! fields are camelCase on the wire.

use serde::{Deserialize, Serialize};

use crate::error::RelayError;

/// Client → Server frame
///
/// Wraps an event with an optional acknowledgement id. When `ack` is
/// present the server answers with `ServerMessage::Ack` carrying the same id.
#[derive(Debug, Deserialize)]
pub struct ClientFrame {
    #[serde(default)]
    pub ack: Option<u64>,
    #[serde(flatten)]
    pub event: ClientEvent,
}

/// Client → Server event
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientEvent {
    /// Join a room under a display name
    Join { username: String, room: String },
    /// Send a text message to the current room
    SendMessage { text: String },
    /// Share a location with the current room
    SendLocation {
        #[serde(alias = "lat")]
        latitude: f64,
        #[serde(alias = "long")]
        longitude: f64,
    },
    /// Leave the room and close the connection
    Leave,
}

/// A single entry of a `roomData` member list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomMember {
    pub username: String,
}

/// Server → Client message
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    /// Connection established, identity issued
    Connected { client_id: String },
    /// Chat or system text
    Message {
        username: String,
        text: String,
        created_at: i64,
    },
    /// Shared location rendered as a map link
    LocationMessage {
        username: String,
        url: String,
        created_at: i64,
    },
    /// Membership snapshot of a room, in join order
    RoomData { room: String, users: Vec<RoomMember> },
    /// Acknowledgement of an inbound frame; `error` is null on success
    Ack { ack: u64, error: Option<String> },
    /// Frame could not be understood
    Error { message: String },
}

impl ServerMessage {
    /// Build the acknowledgement for a handler result
    pub fn ack(ack: u64, result: &Result<(), RelayError>) -> Self {
        ServerMessage::Ack {
            ack,
            error: result.as_ref().err().map(ToString::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_frame_deserialize() {
        let json = r#"{"type": "join", "username": "Alice", "room": "Lobby", "ack": 1}"#;
        let frame: ClientFrame = serde_json::from_str(json).unwrap();
        assert_eq!(frame.ack, Some(1));
        assert_eq!(
            frame.event,
            ClientEvent::Join {
                username: "Alice".to_string(),
                room: "Lobby".to_string(),
            }
        );
    }

    #[test]
    fn test_frame_without_ack() {
        let json = r#"{"type": "sendMessage", "text": "hi"}"#;
        let frame: ClientFrame = serde_json::from_str(json).unwrap();
        assert!(frame.ack.is_none());
        assert_eq!(
            frame.event,
            ClientEvent::SendMessage {
                text: "hi".to_string()
            }
        );
    }

    #[test]
    fn test_location_accepts_short_field_names() {
        let json = r#"{"type": "sendLocation", "lat": 51.5, "long": -0.12}"#;
        let frame: ClientFrame = serde_json::from_str(json).unwrap();
        match frame.event {
            ClientEvent::SendLocation {
                latitude,
                longitude,
            } => {
                assert_eq!(latitude, 51.5);
                assert_eq!(longitude, -0.12);
            }
            _ => panic!("Wrong variant"),
        }
    }

    #[test]
    fn test_unknown_event_rejected() {
        let json = r#"{"type": "typing"}"#;
        assert!(serde_json::from_str::<ClientFrame>(json).is_err());
    }

    #[test]
    fn test_server_message_serialize() {
        let msg = ServerMessage::LocationMessage {
            username: "Bob".to_string(),
            url: "https://google.com/maps?q=1,2".to_string(),
            created_at: 42,
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"locationMessage\""));
        assert!(json.contains("\"createdAt\":42"));
    }

    #[test]
    fn test_room_data_serialize() {
        let msg = ServerMessage::RoomData {
            room: "lobby".to_string(),
            users: vec![RoomMember {
                username: "Alice".to_string(),
            }],
        };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["type"], "roomData");
        assert_eq!(value["users"][0]["username"], "Alice");
    }

    #[test]
    fn test_ack_carries_error_text() {
        let err = Err(RelayError::NameTaken("Username is in use!".to_string()));
        let value = serde_json::to_value(ServerMessage::ack(7, &err)).unwrap();
        assert_eq!(value["ack"], 7);
        assert_eq!(value["error"], "Username is in use!");

        let value = serde_json::to_value(ServerMessage::ack(8, &Ok(()))).unwrap();
        assert!(value["error"].is_null());
    }
}
