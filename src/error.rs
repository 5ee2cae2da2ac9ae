//! Error types for the relay
//!
//! Splits user-facing, recoverable conditions (`RelayError`) from
//! transport failures that end a single connection (`AppError`).
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;

/// Errors reported back to the connection that triggered an event
///
/// Never broadcast. The `Display` text is what the client receives in
/// its acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    /// Empty or oversized display name / room
    #[error("{0}")]
    Validation(String),

    /// Display name already present in the room (case-insensitive)
    #[error("{0}")]
    NameTaken(String),

    /// Content filter refused the message
    #[error("{0}")]
    ContentRejected(String),
}

/// Application-level errors
///
/// All of these are fatal for the connection they occur on and for
/// nothing else.
#[derive(Debug, Error)]
pub enum AppError {
    /// WebSocket protocol error
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// JSON serialization/deserialization error
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Channel send error (internal channel broken)
    #[error("Channel send error")]
    ChannelSend,
}

/// Message send errors
///
/// Occurs when a connection's outbound queue cannot take a message.
#[derive(Debug, Error)]
pub enum SendError {
    /// The receiving end of the channel has been closed
    #[error("Channel closed")]
    ChannelClosed,

    /// The outbound queue is full; the message was dropped
    #[error("Channel full")]
    ChannelFull,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relay_error_displays_ack_text() {
        let err = RelayError::NameTaken("Username is in use!".to_string());
        assert_eq!(err.to_string(), "Username is in use!");
    }

    #[test]
    fn test_json_error_converts() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: AppError = json_err.into();
        assert!(matches!(err, AppError::Json(_)));
        assert!(err.to_string().starts_with("JSON serialization error"));
    }
}
