//! Unified error type for Cowbull.

use cowbull_game::GameError;
use cowbull_protocol::ProtocolError;
use cowbull_session::SessionError;
use cowbull_transport::TransportError;

use crate::HubError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum CowbullError {
    /// A transport-level error (connect, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, malformed message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A local action the session refused.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A match that could not be played to the end.
    #[error(transparent)]
    Game(#[from] GameError),

    /// The player hub refused or is gone.
    #[error(transparent)]
    Hub(#[from] HubError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::ConnectionClosed("gone".into());
        let cowbull_err: CowbullError = err.into();
        assert!(matches!(cowbull_err, CowbullError::Transport(_)));
        assert!(cowbull_err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidMessage("bad".into());
        let cowbull_err: CowbullError = err.into();
        assert!(matches!(cowbull_err, CowbullError::Protocol(_)));
    }

    #[test]
    fn test_from_session_error() {
        let cowbull_err: CowbullError = SessionError::UnknownOpponent("bob".into()).into();
        assert!(matches!(cowbull_err, CowbullError::Session(_)));
        assert_eq!(cowbull_err.to_string(), "player bob not found");
    }

    #[test]
    fn test_from_game_error() {
        let cowbull_err: CowbullError = GameError::Timeout("p1".into()).into();
        assert!(matches!(cowbull_err, CowbullError::Game(_)));
    }

    #[test]
    fn test_from_hub_error() {
        let cowbull_err: CowbullError = HubError::Unavailable.into();
        assert!(matches!(cowbull_err, CowbullError::Hub(_)));
    }
}
