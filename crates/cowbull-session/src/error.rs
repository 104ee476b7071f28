//! Error types for the session layer.

use cowbull_game::DigitsError;

/// Errors returned to the local user when an action cannot be taken.
///
/// None of these change the session state or send anything. Problems
/// with *inbound* messages are never errors: they are logged and the
/// message is dropped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// No player with this display name is on the current roster.
    #[error("player {0} not found")]
    UnknownOpponent(String),

    /// Digit counts must be between 1 and 10.
    #[error("invalid digit count {0}")]
    InvalidDigitCount(usize),

    /// The action does not make sense in the current phase, e.g. a guess
    /// while not guessing.
    #[error("cannot {action} while {phase}")]
    InvalidAction {
        action: &'static str,
        phase: &'static str,
    },

    /// The connection is gone. A new session is needed.
    #[error("session is closed")]
    Closed,

    /// A locally entered number is not a digit sequence.
    #[error("invalid number: {0}")]
    InvalidDigits(#[from] DigitsError),
}
