//! Session phases and the per-match state.
//!
//! ```text
//!   Idle ──(open)──→ Registered ──(connect)──→ Lobby ⇄ InGame(role)
//!     │                  │                      │         │
//!     └──────────────────┴──────(close)─────────┴─────────┴──→ Disconnected
//! ```
//!
//! The secret lives inside [`RoleState::Thinker`], so a guesser cannot
//! hold one, and leaving [`Phase::InGame`] drops it.

use cowbull_game::DigitSequence;
use cowbull_protocol::{PlayerId, Role};

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Phase {
    /// Connection not open yet.
    #[default]
    Idle,
    /// `name` sent, `connect` not yet.
    Registered,
    /// On the roster, not playing.
    Lobby,
    /// Playing a match.
    InGame(MatchState),
    /// The connection is gone. Terminal.
    Disconnected,
}

impl Phase {
    /// A short lowercase label, used in logs and errors.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Registered => "registered",
            Self::Lobby => "in the lobby",
            Self::InGame(state) => match state.role() {
                Role::Thinker => "thinking",
                Role::Guesser => "guessing",
            },
            Self::Disconnected => "disconnected",
        }
    }

    pub fn in_game(&self) -> bool {
        matches!(self, Self::InGame(_))
    }

    /// The current match, if any.
    pub fn match_state(&self) -> Option<&MatchState> {
        match self {
            Self::InGame(state) => Some(state),
            _ => None,
        }
    }
}

/// Role-specific match data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleState {
    Thinker { secret: DigitSequence },
    Guesser,
}

/// Everything a session tracks about the match in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchState {
    role: RoleState,
    digit_count: usize,
    opponent_ids: Vec<PlayerId>,
}

impl MatchState {
    /// A thinker's match. The digit count is the secret's length.
    pub fn thinking(secret: DigitSequence) -> Self {
        Self {
            digit_count: secret.len(),
            role: RoleState::Thinker { secret },
            opponent_ids: Vec::new(),
        }
    }

    /// A guesser's match against `opponent_ids` (empty against the AI).
    pub fn guessing(digit_count: usize, opponent_ids: Vec<PlayerId>) -> Self {
        Self {
            role: RoleState::Guesser,
            digit_count,
            opponent_ids,
        }
    }

    pub fn role(&self) -> Role {
        match self.role {
            RoleState::Thinker { .. } => Role::Thinker,
            RoleState::Guesser => Role::Guesser,
        }
    }

    /// The secret, when thinking.
    pub fn secret(&self) -> Option<&DigitSequence> {
        match &self.role {
            RoleState::Thinker { secret } => Some(secret),
            RoleState::Guesser => None,
        }
    }

    pub fn digit_count(&self) -> usize {
        self.digit_count
    }

    /// A guesser learns the agreed length from each `guess` request.
    pub(crate) fn set_digit_count(&mut self, digit_count: usize) {
        debug_assert!(matches!(self.role, RoleState::Guesser));
        self.digit_count = digit_count;
    }

    pub fn opponent_ids(&self) -> &[PlayerId] {
        &self.opponent_ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thinking_digit_count_matches_secret() {
        let state = MatchState::thinking("0451".parse().unwrap());
        assert_eq!(state.role(), Role::Thinker);
        assert_eq!(state.digit_count(), 4);
        assert_eq!(state.secret().map(DigitSequence::as_str), Some("0451"));
        assert!(state.opponent_ids().is_empty());
    }

    #[test]
    fn test_guessing_has_no_secret() {
        let state = MatchState::guessing(3, vec!["p1".into()]);
        assert_eq!(state.role(), Role::Guesser);
        assert_eq!(state.secret(), None);
        assert_eq!(state.opponent_ids(), &[PlayerId::from("p1")]);
    }

    #[test]
    fn test_phase_label_and_in_game() {
        assert_eq!(Phase::default(), Phase::Idle);
        assert!(!Phase::Lobby.in_game());
        let phase = Phase::InGame(MatchState::guessing(4, vec![]));
        assert!(phase.in_game());
        assert_eq!(phase.label(), "guessing");
        assert_eq!(phase.match_state().map(MatchState::digit_count), Some(4));
    }
}
