//! The message catalogue, one enum per direction.
//!
//! Some wire names are used both ways with different payloads. `try`
//! carries a guessed number from the server to the thinker and a score
//! from the thinker back; `think` and `guess` are requests one way and
//! answers the other. Splitting the catalogue by direction turns each of
//! those into two distinct variants sharing one wire tag, so which one a
//! frame is depends on who received it, never on its payload shape.
//!
//! | wire     | [`ClientMessage`] (client → server) | [`ServerMessage`] (server → client) |
//! |----------|-------------------------------------|-------------------------------------|
//! | name     | `Name`                              | -                                   |
//! | connect  | `Connect`                           | -                                   |
//! | play     | `Play`                              | -                                   |
//! | think    | `Think`                             | `ThinkRequest`                      |
//! | guess    | `Guess`                             | `GuessRequest`                      |
//! | try      | `TryResponse`                       | `TryRequest`                        |
//! | tell     | -                                   | `Tell`                              |
//! | players  | -                                   | `Players`                           |

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{Codec, Envelope, MessageName, PlaySettings, PlayerInfo, ProtocolError, Score};

// Payload shapes nested inside `Envelope::data`.

#[derive(Serialize, Deserialize)]
struct NameData {
    name: String,
}

#[derive(Serialize, Deserialize)]
struct DigitsData {
    digits: usize,
}

#[derive(Serialize, Deserialize)]
struct NumberData {
    number: String,
}

#[derive(Serialize, Deserialize)]
struct ThinkRequestData {
    #[serde(default)]
    digits: Option<usize>,
}

/// Messages a client sends to the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    /// The player's chosen display name. Sent once, before `Connect`.
    Name { name: String },
    /// Join the roster. Sent once, with empty data.
    Connect,
    /// Start a match.
    Play(PlaySettings),
    /// The thinker has picked a secret of `digits` digits.
    Think { digits: usize },
    /// The guesser's next guess.
    Guess { number: String },
    /// The thinker's score for the last `TryRequest`.
    TryResponse(Score),
    /// A name the server does not handle. Dropped by the receiver.
    Unrecognized { name: String },
}

/// Messages the server sends to a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    /// A full roster snapshot. Replaces any earlier one.
    Players(Vec<PlayerInfo>),
    /// You have been challenged: pick a secret. Usually empty data;
    /// a digit count, when present, is informational.
    ThinkRequest { digits: Option<usize> },
    /// Make a guess at a secret of `digits` digits.
    GuessRequest { digits: usize },
    /// Score this guess against your secret.
    TryRequest { number: String },
    /// The score of your last guess.
    Tell(Score),
    /// A name this client does not handle. Dropped by the receiver.
    Unrecognized { name: String },
}

impl ClientMessage {
    /// The wire name of this message.
    pub fn name(&self) -> &str {
        match self {
            Self::Name { .. } => MessageName::Name.as_str(),
            Self::Connect => MessageName::Connect.as_str(),
            Self::Play(_) => MessageName::Play.as_str(),
            Self::Think { .. } => MessageName::Think.as_str(),
            Self::Guess { .. } => MessageName::Guess.as_str(),
            Self::TryResponse(_) => MessageName::Try.as_str(),
            Self::Unrecognized { name } => name,
        }
    }

    /// Encodes this message into an envelope.
    ///
    /// # Errors
    /// `ProtocolError::InvalidMessage` for `Unrecognized`, which has no
    /// wire form; codec errors otherwise.
    pub fn encode<C: Codec>(&self, codec: &C) -> Result<Envelope, ProtocolError> {
        let envelope = match self {
            Self::Name { name } => Envelope::new(
                MessageName::Name,
                codec.encode(&NameData { name: name.clone() })?,
            ),
            Self::Connect => Envelope::new(MessageName::Connect, ""),
            Self::Play(settings) => {
                Envelope::new(MessageName::Play, codec.encode(settings)?)
            }
            Self::Think { digits } => Envelope::new(
                MessageName::Think,
                codec.encode(&DigitsData { digits: *digits })?,
            ),
            Self::Guess { number } => Envelope::new(
                MessageName::Guess,
                codec.encode(&NumberData {
                    number: number.clone(),
                })?,
            ),
            Self::TryResponse(score) => {
                Envelope::new(MessageName::Try, codec.encode(score)?)
            }
            Self::Unrecognized { name } => {
                return Err(ProtocolError::InvalidMessage(format!(
                    "cannot encode unrecognized message '{name}'"
                )));
            }
        };
        Ok(envelope)
    }

    /// Decodes an envelope received by the server.
    ///
    /// Names outside the catalogue, and names only the server sends,
    /// decode to `Unrecognized`.
    ///
    /// # Errors
    /// `ProtocolError::MalformedPayload` if `data` does not fit `name`.
    pub fn decode<C: Codec>(codec: &C, envelope: &Envelope) -> Result<Self, ProtocolError> {
        let unrecognized = || Self::Unrecognized {
            name: envelope.name.clone(),
        };
        let Some(name) = envelope.message_name() else {
            return Ok(unrecognized());
        };
        let msg = match name {
            MessageName::Name => Self::Name {
                name: payload::<NameData, _>(codec, envelope)?.name,
            },
            MessageName::Connect => Self::Connect,
            MessageName::Play => Self::Play(payload(codec, envelope)?),
            MessageName::Think => Self::Think {
                digits: payload::<DigitsData, _>(codec, envelope)?.digits,
            },
            MessageName::Guess => Self::Guess {
                number: payload::<NumberData, _>(codec, envelope)?.number,
            },
            MessageName::Try => Self::TryResponse(payload(codec, envelope)?),
            MessageName::Tell | MessageName::Players => unrecognized(),
        };
        Ok(msg)
    }
}

impl ServerMessage {
    /// The wire name of this message.
    pub fn name(&self) -> &str {
        match self {
            Self::Players(_) => MessageName::Players.as_str(),
            Self::ThinkRequest { .. } => MessageName::Think.as_str(),
            Self::GuessRequest { .. } => MessageName::Guess.as_str(),
            Self::TryRequest { .. } => MessageName::Try.as_str(),
            Self::Tell(_) => MessageName::Tell.as_str(),
            Self::Unrecognized { name } => name,
        }
    }

    /// Encodes this message into an envelope.
    ///
    /// # Errors
    /// `ProtocolError::InvalidMessage` for `Unrecognized`; codec errors
    /// otherwise.
    pub fn encode<C: Codec>(&self, codec: &C) -> Result<Envelope, ProtocolError> {
        let envelope = match self {
            Self::Players(players) => {
                Envelope::new(MessageName::Players, codec.encode(players)?)
            }
            Self::ThinkRequest { digits: None } => {
                Envelope::new(MessageName::Think, "")
            }
            Self::ThinkRequest { digits } => Envelope::new(
                MessageName::Think,
                codec.encode(&ThinkRequestData { digits: *digits })?,
            ),
            Self::GuessRequest { digits } => Envelope::new(
                MessageName::Guess,
                codec.encode(&DigitsData { digits: *digits })?,
            ),
            Self::TryRequest { number } => Envelope::new(
                MessageName::Try,
                codec.encode(&NumberData {
                    number: number.clone(),
                })?,
            ),
            Self::Tell(score) => {
                Envelope::new(MessageName::Tell, codec.encode(score)?)
            }
            Self::Unrecognized { name } => {
                return Err(ProtocolError::InvalidMessage(format!(
                    "cannot encode unrecognized message '{name}'"
                )));
            }
        };
        Ok(envelope)
    }

    /// Decodes an envelope received by a client.
    ///
    /// Names outside the catalogue, and names only clients send, decode
    /// to `Unrecognized`.
    ///
    /// # Errors
    /// `ProtocolError::MalformedPayload` if `data` does not fit `name`.
    pub fn decode<C: Codec>(codec: &C, envelope: &Envelope) -> Result<Self, ProtocolError> {
        let unrecognized = || Self::Unrecognized {
            name: envelope.name.clone(),
        };
        let Some(name) = envelope.message_name() else {
            return Ok(unrecognized());
        };
        let msg = match name {
            MessageName::Players => Self::Players(payload(codec, envelope)?),
            MessageName::Think if envelope.data.trim().is_empty() => {
                Self::ThinkRequest { digits: None }
            }
            MessageName::Think => Self::ThinkRequest {
                digits: payload::<ThinkRequestData, _>(codec, envelope)?.digits,
            },
            MessageName::Guess => Self::GuessRequest {
                digits: payload::<DigitsData, _>(codec, envelope)?.digits,
            },
            MessageName::Try => Self::TryRequest {
                number: payload::<NumberData, _>(codec, envelope)?.number,
            },
            MessageName::Tell => Self::Tell(payload(codec, envelope)?),
            MessageName::Connect | MessageName::Name | MessageName::Play => {
                unrecognized()
            }
        };
        Ok(msg)
    }
}

/// Decodes `envelope.data` as `T`, tagging failures with the message name.
fn payload<T: DeserializeOwned, C: Codec>(
    codec: &C,
    envelope: &Envelope,
) -> Result<T, ProtocolError> {
    codec
        .decode(&envelope.data)
        .map_err(|e| ProtocolError::MalformedPayload {
            name: envelope.name.clone(),
            reason: e.to_string(),
        })
}

// =========================================================================
// Tests
// =========================================================================
