//! Error types for the protocol layer.
//!
//! Decoding failures are split in two: text that is not an envelope at
//! all, and an envelope whose `data` does not match what its `name`
//! promises. Both are recoverable; a session logs them and moves on.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into text).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning text into a Rust type).
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The text frame is not a `{name, data}` envelope.
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// The envelope's `data` could not be parsed as the payload its
    /// `name` requires (bad JSON, missing or mistyped fields).
    #[error("malformed payload for '{name}': {reason}")]
    MalformedPayload { name: String, reason: String },

    /// The message is invalid at the protocol level, e.g. an attempt to
    /// encode a message that has no wire form.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
