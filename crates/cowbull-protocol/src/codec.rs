//! Codec trait and implementations for serializing/deserializing payloads.
//!
//! Every message travels as text: the envelope itself, and the `data`
//! string nested inside it. The protocol layer only needs something that
//! implements [`Codec`]; [`JsonCodec`] is the one the game speaks.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// A codec that can encode Rust types to text and decode text back.
///
/// `Send + Sync + 'static` because one codec instance is shared by the
/// connection handler and every game task that talks to the peer.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into text.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError>;

    /// Deserializes text back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the text is malformed,
    /// incomplete, or doesn't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &str) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// ## Example
///
/// ```rust
/// use cowbull_protocol::{ClientMessage, JsonCodec};
///
/// let codec = JsonCodec;
/// let envelope = ClientMessage::Guess { number: "1234".into() }
///     .encode(&codec)
///     .unwrap();
/// assert_eq!(envelope.name, "guess");
/// assert_eq!(envelope.data, r#"{"number":"1234"}"#);
///
/// let decoded = ClientMessage::decode(&codec, &envelope).unwrap();
/// assert_eq!(decoded, ClientMessage::Guess { number: "1234".into() });
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError> {
        serde_json::to_string(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &str) -> Result<T, ProtocolError> {
        serde_json::from_str(data).map_err(ProtocolError::Decode)
    }
}
