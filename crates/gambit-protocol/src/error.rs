//! Error types for the protocol layer.
//!
//! Each crate in Gambit defines its own error enum. When you see a
//! `ProtocolError`, the problem is in serialization or in a value that
//! arrived on the wire, not in networking or room management.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning an event into bytes).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into an event).
    ///
    /// Common causes: malformed JSON, an unknown event name, missing
    /// payload fields.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// A room id that is empty once whitespace is trimmed.
    #[error("room id must not be blank")]
    BlankRoomId,
}
