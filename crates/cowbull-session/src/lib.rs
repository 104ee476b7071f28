//! Client-side session handling for Cowbull.
//!
//! A session is one connection's view of the game:
//!
//! 1. **Registration**: send a name, join the lobby
//! 2. **Roster**: track who else is connected ([`PlayerRegistry`])
//! 3. **Matches**: play as guesser or thinker ([`SessionMachine`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Client driver (above)  ← feeds messages and user actions in, sends Output
//!     ↕
//! Session Layer (this crate)  ← phases, roles, scoring of opponent guesses
//!     ↕
//! Game + Protocol (below)  ← DigitSequence, score, message catalogue
//! ```
//!
//! The machine is transport-free: every step returns an [`Output`] with
//! the messages to send and the [`SessionEvent`]s to show.

#![allow(async_fn_in_trait)]

mod error;
mod event;
mod input;
mod machine;
mod registry;
mod state;

pub use error::SessionError;
pub use event::{Output, SessionEvent};
pub use input::{InputProvider, ScriptedInput};
pub use machine::{Opponent, SessionMachine};
pub use registry::PlayerRegistry;
pub use state::{MatchState, Phase, RoleState};
