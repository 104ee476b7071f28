//! Wire protocol for Cowbull.
//!
//! This crate defines the "language" that game clients and the server
//! speak:
//!
//! - **Types** ([`Envelope`], [`PlayerInfo`], [`PlaySettings`], [`Score`],
//!   etc.): the structures that travel on the wire.
//! - **Messages** ([`ClientMessage`], [`ServerMessage`]): the closed
//!   message catalogue, one enum per direction.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how payloads are
//!   converted to/from text.
//! - **Errors** ([`ProtocolError`]).
//!
//! # Architecture
//!
//! ```text
//! Transport (text) → Protocol (Envelope → message) → Session (state machine)
//! ```

mod codec;
mod error;
mod message;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use message::{ClientMessage, ServerMessage};
pub use types::{
    Envelope, MessageName, PlaySettings, PlayerId, PlayerInfo, Role, Score,
};
