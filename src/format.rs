//! Outbound message formatting
//!
//! Stamps outgoing payloads with a creation time. The clock is a trait so
//! the router can be driven deterministically in tests.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::message::ServerMessage;

/// Sender name used for system notices
pub const ADMIN_NAME: &str = "Admin";

/// Source of `createdAt` timestamps (Unix epoch milliseconds)
pub trait Clock: Send {
    fn now(&self) -> i64;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or_default()
    }
}

/// Build a text message event
pub fn text_message(clock: &dyn Clock, username: &str, text: &str) -> ServerMessage {
    ServerMessage::Message {
        username: username.to_string(),
        text: text.to_string(),
        created_at: clock.now(),
    }
}

/// Build a location message event linking to a map of the coordinates
pub fn location_message(
    clock: &dyn Clock,
    username: &str,
    latitude: f64,
    longitude: f64,
) -> ServerMessage {
    ServerMessage::LocationMessage {
        username: username.to_string(),
        url: map_url(latitude, longitude),
        created_at: clock.now(),
    }
}

pub fn map_url(latitude: f64, longitude: f64) -> String {
    format!("https://google.com/maps?q={},{}", latitude, longitude)
}
