//! What a session reports to whoever is presenting the game.

use cowbull_protocol::{ClientMessage, PlayerInfo, Role, Score};

/// Something the user should see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// `name` and `connect` went out; the session is in the lobby.
    Registered { name: String },

    /// The server wants a guess for a secret of `digits` digits.
    GuessRequested { digits: usize },

    /// Our last guess was scored.
    ScoreReceived { score: Score, is_win: bool },

    /// The opponent guessed `number` against our secret.
    OpponentGuessReceived { number: String },

    /// We answered the opponent's guess with `score`.
    OpponentScoreSent { score: Score, is_win: bool },

    /// A new roster arrived.
    RosterUpdated { players: Vec<PlayerInfo> },

    MatchStarted { role: Role },

    /// The match is over. `won` is always `false` for the thinker.
    MatchEnded { won: bool },

    /// The match was dropped without a result (e.g. it stalled).
    MatchAbandoned,

    /// The connection is gone. Nothing more will happen.
    Disconnected,
}

/// The result of one session step: messages to send, in order, and
/// events to show.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Output {
    pub outbound: Vec<ClientMessage>,
    pub events: Vec<SessionEvent>,
}

impl Output {
    pub(crate) fn send(&mut self, msg: ClientMessage) -> &mut Self {
        self.outbound.push(msg);
        self
    }

    pub(crate) fn event(&mut self, event: SessionEvent) -> &mut Self {
        self.events.push(event);
        self
    }

    /// `true` when the step neither sends nor reports anything.
    pub fn is_empty(&self) -> bool {
        self.outbound.is_empty() && self.events.is_empty()
    }
}
