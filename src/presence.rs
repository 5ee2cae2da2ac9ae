//! Presence registry
//!
//! The authoritative map of connection → (display name, room). Rooms are
//! not stored on their own: a room's membership is whatever records
//! currently carry its key, kept in join order.
//!
//! Every mutation takes `&mut self`; the registry is owned by the
//! `ChatServer` actor, which serializes all access.

use std::collections::HashMap;

use tracing::debug;

use crate::error::RelayError;
use crate::types::{ClientId, RoomKey};

/// A joined connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub client_id: ClientId,
    /// Trimmed, case preserved
    pub username: String,
    pub room: RoomKey,
}

impl UserRecord {
    fn name_key(&self) -> String {
        self.username.to_lowercase()
    }
}

#[derive(Debug, Default)]
pub struct PresenceRegistry {
    /// All joined connections: ClientId -> UserRecord
    users: HashMap<ClientId, UserRecord>,
    /// Join order per room: RoomKey -> [ClientId]
    rooms: HashMap<RoomKey, Vec<ClientId>>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection under a display name in a room
    ///
    /// Fails without touching the registry when the name or room is blank,
    /// when the connection already joined, or when the room already holds
    /// the same name in any letter case.
    pub fn add_user(
        &mut self,
        client_id: ClientId,
        username: &str,
        room: &str,
    ) -> Result<UserRecord, RelayError> {
        let username = username.trim();
        let room = RoomKey::canonical(room);

        if username.is_empty() || room.is_empty() {
            return Err(RelayError::Validation(
                "Username and room are required!".to_string(),
            ));
        }
        if self.users.contains_key(&client_id) {
            return Err(RelayError::Validation(
                "You have already joined a room!".to_string(),
            ));
        }

        let name_key = username.to_lowercase();
        let taken = self
            .rooms
            .get(&room)
            .into_iter()
            .flatten()
            .filter_map(|id| self.users.get(id))
            .any(|user| user.name_key() == name_key);
        if taken {
            return Err(RelayError::NameTaken("Username is in use!".to_string()));
        }

        let record = UserRecord {
            client_id,
            username: username.to_string(),
            room: room.clone(),
        };
        self.users.insert(client_id, record.clone());
        self.rooms.entry(room).or_default().push(client_id);

        debug!(
            "Presence: {} users in {} rooms",
            self.users.len(),
            self.rooms.len()
        );
        Ok(record)
    }

    /// Drop a connection's record, returning it if there was one
    pub fn remove_user(&mut self, client_id: ClientId) -> Option<UserRecord> {
        let record = self.users.remove(&client_id)?;

        if let Some(members) = self.rooms.get_mut(&record.room) {
            members.retain(|id| *id != client_id);
            if members.is_empty() {
                self.rooms.remove(&record.room);
                debug!("Room {} is now empty", record.room);
            }
        }

        Some(record)
    }

    pub fn get_user(&self, client_id: ClientId) -> Option<UserRecord> {
        self.users.get(&client_id).cloned()
    }

    /// Snapshot of a room's members in join order
    ///
    /// Accepts the room as typed by a client; it is canonicalized first.
    pub fn get_users_in_room(&self, room: &str) -> Vec<UserRecord> {
        self.members_of(&RoomKey::canonical(room))
    }

    pub(crate) fn members_of(&self, room: &RoomKey) -> Vec<UserRecord> {
        self.rooms
            .get(room)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.users.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of joined connections across all rooms
    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    /// Number of rooms with at least one member
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn names(users: &[UserRecord]) -> Vec<&str> {
        users.iter().map(|u| u.username.as_str()).collect()
    }

    fn assert_names_unique_per_room(registry: &PresenceRegistry) {
        for (room, ids) in &registry.rooms {
            let mut seen = HashSet::new();
            for id in ids {
                let user = &registry.users[id];
                assert_eq!(&user.room, room);
                assert!(
                    seen.insert(user.name_key()),
                    "duplicate name {} in room {}",
                    user.username,
                    room
                );
            }
        }
    }

    #[test]
    fn test_add_user_trims_and_canonicalizes() {
        let mut registry = PresenceRegistry::new();
        let id = ClientId::new();

        let user = registry.add_user(id, "  Alice ", " Lobby ").unwrap();

        assert_eq!(user.client_id, id);
        assert_eq!(user.username, "Alice");
        assert_eq!(user.room.as_str(), "lobby");
        assert_eq!(registry.get_user(id), Some(user));
    }

    #[test]
    fn test_add_user_requires_name_and_room() {
        let mut registry = PresenceRegistry::new();

        let err = registry.add_user(ClientId::new(), "", "r1").unwrap_err();
        assert!(matches!(err, RelayError::Validation(_)));

        let err = registry.add_user(ClientId::new(), "Bob", "   ").unwrap_err();
        assert!(matches!(err, RelayError::Validation(_)));

        assert_eq!(registry.user_count(), 0);
        assert_eq!(registry.room_count(), 0);
    }

    #[test]
    fn test_add_user_accepts_long_names() {
        let mut registry = PresenceRegistry::new();
        let id = ClientId::new();
        let long_room = "r".repeat(200);

        let user = registry
            .add_user(id, "Bartholomew Montgomery-Fitzwilliam III", &long_room)
            .unwrap();

        assert_eq!(user.username, "Bartholomew Montgomery-Fitzwilliam III");
        assert_eq!(registry.get_users_in_room(&long_room), vec![user]);
    }

    #[test]
    fn test_name_collision_ignores_case_and_whitespace() {
        let mut registry = PresenceRegistry::new();
        registry.add_user(ClientId::new(), "Bob", "R1").unwrap();

        let err = registry.add_user(ClientId::new(), " bob ", "r1").unwrap_err();
        assert!(matches!(err, RelayError::NameTaken(_)));
        assert_eq!(registry.get_users_in_room("r1").len(), 1);
    }

    #[test]
    fn test_same_name_allowed_in_other_room() {
        let mut registry = PresenceRegistry::new();
        registry.add_user(ClientId::new(), "Bob", "r1").unwrap();
        registry.add_user(ClientId::new(), "Bob", "r2").unwrap();

        assert_eq!(registry.room_count(), 2);
    }

    #[test]
    fn test_connection_joins_once() {
        let mut registry = PresenceRegistry::new();
        let id = ClientId::new();
        registry.add_user(id, "Bob", "r1").unwrap();

        let err = registry.add_user(id, "Robert", "r2").unwrap_err();
        assert!(matches!(err, RelayError::Validation(_)));
        assert_eq!(registry.get_user(id).unwrap().username, "Bob");
        assert!(registry.get_users_in_room("r2").is_empty());
    }

    #[test]
    fn test_remove_user_idempotent() {
        let mut registry = PresenceRegistry::new();
        let id = ClientId::new();
        registry.add_user(id, "Bob", "r1").unwrap();

        let removed = registry.remove_user(id).unwrap();
        assert_eq!(removed.username, "Bob");
        assert!(registry.remove_user(id).is_none());
        assert!(registry.get_user(id).is_none());
        assert_eq!(registry.room_count(), 0);
    }

    #[test]
    fn test_remove_unknown_user() {
        let mut registry = PresenceRegistry::new();
        assert!(registry.remove_user(ClientId::new()).is_none());
    }

    #[test]
    fn test_users_in_room_keep_join_order() {
        let mut registry = PresenceRegistry::new();
        let a = ClientId::new();
        let b = ClientId::new();
        registry.add_user(a, "Zed", "R1").unwrap();
        registry.add_user(b, "Amy", "R1").unwrap();

        assert_eq!(names(&registry.get_users_in_room("r1")), vec!["Zed", "Amy"]);

        registry.remove_user(a);
        assert_eq!(names(&registry.get_users_in_room("r1")), vec!["Amy"]);
    }

    #[test]
    fn test_name_freed_after_removal() {
        let mut registry = PresenceRegistry::new();
        let id = ClientId::new();
        registry.add_user(id, "Bob", "r1").unwrap();
        registry.remove_user(id);

        assert!(registry.add_user(ClientId::new(), "BOB", "r1").is_ok());
    }

    #[test]
    fn test_names_stay_unique_across_join_sequence() {
        let mut registry = PresenceRegistry::new();
        let variants = ["bob", "Bob", " BOB", "alice", "ALICE ", "carol"];
        let rooms = ["r1", "R1", " r2", "R2 "];
        let mut joined = Vec::new();

        for (i, name) in variants.iter().cycle().take(48).enumerate() {
            let id = ClientId::new();
            let room = rooms[i % rooms.len()];
            if registry.add_user(id, name, room).is_ok() {
                joined.push(id);
            }
            if i % 5 == 4 {
                if let Some(id) = joined.first().copied() {
                    joined.remove(0);
                    registry.remove_user(id);
                }
            }
            assert_names_unique_per_room(&registry);
        }
    }
}
