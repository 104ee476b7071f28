//! Core protocol types for Cowbull's wire format.
//!
//! Every frame on the wire is an [`Envelope`]: a message `name` and a
//! `data` string that is itself an encoded payload. The payload shapes
//! live here too, so both peers agree on them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Codec, ProtocolError};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a player, assigned by the server.
///
/// `#[serde(transparent)]` keeps it a plain JSON string on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

/// One roster entry, as broadcast in a `players` message.
///
/// `name` may be empty when the player never sent one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub id: PlayerId,
    #[serde(default)]
    pub name: String,
}

impl PlayerInfo {
    /// The name to show for this player: its name, or its id when the
    /// name is empty.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            self.id.as_str()
        } else {
            &self.name
        }
    }
}

// ---------------------------------------------------------------------------
// Game vocabulary
// ---------------------------------------------------------------------------

/// The part a peer plays in one match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Picks the secret and scores guesses.
    Thinker,
    /// Submits guesses until the secret is found.
    Guesser,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Thinker => f.write_str("thinker"),
            Self::Guesser => f.write_str("guesser"),
        }
    }
}

/// The result of comparing a guess with a secret.
///
/// Bulls are right digits in the right place; cows are right digits in
/// the wrong place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Score {
    pub cows: usize,
    pub bulls: usize,
}

impl Score {
    /// No cows, no bulls.
    pub const ZERO: Score = Score { cows: 0, bulls: 0 };

    /// Creates a score.
    pub fn new(cows: usize, bulls: usize) -> Self {
        Self { cows, bulls }
    }

    /// Whether this score finds a secret of `digit_count` digits.
    pub fn is_win(&self, digit_count: usize) -> bool {
        self.bulls == digit_count
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} cows and {} bulls", self.cows, self.bulls)
    }
}

/// Settings a client sends with `play` to start a match.
///
/// The wire key for `ai` is `AI`; lowercase `ai` is accepted too.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaySettings {
    #[serde(rename = "AI", alias = "ai", default)]
    pub ai: bool,
    pub digits: usize,
    pub role: Role,
    #[serde(default)]
    pub opponents: Vec<PlayerId>,
}

// ---------------------------------------------------------------------------
// MessageName
// ---------------------------------------------------------------------------

/// The closed set of message names the protocol knows.
///
/// Anything else on the wire is carried through as an unrecognized name
/// and ignored by the receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageName {
    Connect,
    Name,
    Play,
    Think,
    Guess,
    Tell,
    Try,
    Players,
}

impl MessageName {
    /// Every known name, in catalogue order.
    pub const ALL: [MessageName; 8] = [
        Self::Connect,
        Self::Name,
        Self::Play,
        Self::Think,
        Self::Guess,
        Self::Tell,
        Self::Try,
        Self::Players,
    ];

    /// The name as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::Name => "name",
            Self::Play => "play",
            Self::Think => "think",
            Self::Guess => "guess",
            Self::Tell => "tell",
            Self::Try => "try",
            Self::Players => "players",
        }
    }

    /// Looks up a wire name. Returns `None` for names outside the catalogue.
    pub fn from_wire(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|known| known.as_str() == name)
    }
}

impl fmt::Display for MessageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Envelope: the top-level wire format
// ---------------------------------------------------------------------------

/// The top-level message wrapper. Every frame on the wire is an Envelope.
///
/// ```text
/// { "name": "tell", "data": "{\"cows\":1,\"bulls\":2}" }
/// ```
///
/// `data` is a string, not a nested object: the payload is encoded on
/// its own and only interpreted once `name` is known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub name: String,
    #[serde(default)]
    pub data: String,
}

impl Envelope {
    /// Creates an envelope from a known name and already-encoded data.
    pub fn new(name: MessageName, data: impl Into<String>) -> Self {
        Self {
            name: name.as_str().to_owned(),
            data: data.into(),
        }
    }

    /// The known message name, if this envelope carries one.
    pub fn message_name(&self) -> Option<MessageName> {
        MessageName::from_wire(&self.name)
    }

    /// Parses one text frame into an envelope.
    ///
    /// # Errors
    /// Returns `ProtocolError::MalformedEnvelope` if the text is not a
    /// `{name, data}` object.
    pub fn from_text<C: Codec>(codec: &C, text: &str) -> Result<Self, ProtocolError> {
        codec
            .decode(text)
            .map_err(|e| ProtocolError::MalformedEnvelope(e.to_string()))
    }

    /// Encodes the envelope as one text frame.
    pub fn to_text<C: Codec>(&self, codec: &C) -> Result<String, ProtocolError> {
        codec.encode(self)
    }
}

// =========================================================================
// Tests
// =========================================================================
