//! The session state machine.
//!
//! One [`SessionMachine`] per connection. It is fed three kinds of input,
//! one at a time:
//!
//! 1. **Connection lifecycle**: [`on_open`](SessionMachine::on_open) and
//!    [`on_close`](SessionMachine::on_close)
//! 2. **Inbound messages**: [`handle`](SessionMachine::handle)
//! 3. **Local actions**: [`start_match`](SessionMachine::start_match),
//!    [`submit_guess`](SessionMachine::submit_guess),
//!    [`abandon_match`](SessionMachine::abandon_match)
//!
//! Each step returns an [`Output`]: the messages to send and the events
//! to show. The machine never touches the network itself.
//!
//! Inbound messages that do not fit the current phase (a `try` while not
//! thinking, a `think` mid-match, anything after disconnect) are dropped
//! with a debug log. Only local actions can fail, and a failed local
//! action changes nothing.

use cowbull_game::{DigitSequence, is_valid_digit_count, score_or_zero};
use cowbull_protocol::{ClientMessage, PlaySettings, PlayerInfo, Role, Score, ServerMessage};

use crate::{InputProvider, MatchState, Output, Phase, PlayerRegistry, SessionError, SessionEvent};

/// Who to play against when starting a match as the guesser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Opponent {
    /// A computer thinker on the server.
    Ai,
    /// A connected player, by display name.
    Named(String),
}

/// One connection's game state.
pub struct SessionMachine<I> {
    input: I,
    phase: Phase,
    registry: PlayerRegistry,
}

impl<I: InputProvider> SessionMachine<I> {
    pub fn new(input: I) -> Self {
        Self {
            input,
            phase: Phase::Idle,
            registry: PlayerRegistry::new(),
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn registry(&self) -> &PlayerRegistry {
        &self.registry
    }

    // -----------------------------------------------------------------------
    // Connection lifecycle
    // -----------------------------------------------------------------------

    /// The connection is up: register a name and join the lobby.
    ///
    /// Sends `name` then `connect`. A cancelled name prompt registers an
    /// empty name. Does nothing unless the session is idle.
    pub async fn on_open(&mut self) -> Output {
        let mut out = Output::default();
        if self.phase != Phase::Idle {
            tracing::debug!(phase = self.phase.label(), "ignoring open");
            return out;
        }

        let name = self.input.display_name().await.unwrap_or_default();
        out.send(ClientMessage::Name { name: name.clone() });
        self.phase = Phase::Registered;

        out.send(ClientMessage::Connect);
        self.phase = Phase::Lobby;

        tracing::info!(%name, "registered");
        out.event(SessionEvent::Registered { name });
        out
    }

    /// The connection is gone, cleanly or not. Drops all state. Terminal.
    pub fn on_close(&mut self) -> Output {
        let mut out = Output::default();
        if self.phase == Phase::Disconnected {
            return out;
        }
        if self.phase.in_game() {
            tracing::warn!(phase = self.phase.label(), "disconnected mid-match");
        }
        self.phase = Phase::Disconnected;
        self.registry = PlayerRegistry::new();
        out.event(SessionEvent::Disconnected);
        out
    }

    // -----------------------------------------------------------------------
    // Inbound messages
    // -----------------------------------------------------------------------

    /// Handles one message from the server.
    pub async fn handle(&mut self, msg: ServerMessage) -> Output {
        if self.phase == Phase::Disconnected {
            tracing::debug!(name = msg.name(), "ignoring message after disconnect");
            return Output::default();
        }

        match msg {
            ServerMessage::Players(players) => self.on_players(players),
            ServerMessage::ThinkRequest { digits } => self.on_think(digits).await,
            ServerMessage::GuessRequest { digits } => self.on_guess_request(digits),
            ServerMessage::TryRequest { number } => self.on_try(number),
            ServerMessage::Tell(score) => self.on_tell(score),
            ServerMessage::Unrecognized { name } => {
                tracing::debug!(%name, "ignoring unrecognized message");
                Output::default()
            }
        }
    }

    fn on_players(&mut self, players: Vec<PlayerInfo>) -> Output {
        let mut out = Output::default();
        tracing::debug!(count = players.len(), "roster updated");
        self.registry.replace(players.clone());
        out.event(SessionEvent::RosterUpdated { players });
        out
    }

    /// Someone challenged us: pick a secret and start thinking.
    async fn on_think(&mut self, digits: Option<usize>) -> Output {
        let mut out = Output::default();
        if self.phase != Phase::Lobby {
            tracing::debug!(phase = self.phase.label(), "ignoring think");
            return out;
        }

        let Some(answer) = self.input.secret_number(digits).await else {
            tracing::info!("challenge declined");
            return out;
        };
        let secret = match DigitSequence::parse(answer.trim()) {
            Ok(secret) => secret,
            Err(e) => {
                tracing::warn!(error = %e, "secret is not a number, declining challenge");
                return out;
            }
        };

        let digit_count = secret.len();
        self.phase = Phase::InGame(MatchState::thinking(secret));
        tracing::info!(digits = digit_count, "match started as thinker");
        out.send(ClientMessage::Think {
            digits: digit_count,
        })
        .event(SessionEvent::MatchStarted {
            role: Role::Thinker,
        });
        out
    }

    fn on_guess_request(&mut self, digits: usize) -> Output {
        let mut out = Output::default();
        let guessing = self
            .phase
            .match_state()
            .is_some_and(|state| state.role() == Role::Guesser);
        if !guessing {
            tracing::debug!(phase = self.phase.label(), "ignoring guess request");
            return out;
        }

        if let Phase::InGame(state) = &mut self.phase {
            state.set_digit_count(digits);
        }
        out.event(SessionEvent::GuessRequested { digits });
        out
    }

    /// The opponent's guess, to be scored against our secret.
    ///
    /// Always answers exactly once. A guess that cannot be scored is
    /// answered with zero.
    fn on_try(&mut self, number: String) -> Output {
        let mut out = Output::default();
        let Some(state) = self.phase.match_state() else {
            tracing::debug!(phase = self.phase.label(), "ignoring try");
            return out;
        };
        let Some(secret) = state.secret() else {
            tracing::debug!(phase = self.phase.label(), "ignoring try");
            return out;
        };

        let score = score_or_zero(secret, &number);
        let is_win = score.is_win(state.digit_count());
        tracing::debug!(%number, %score, "scored opponent guess");

        out.send(ClientMessage::TryResponse(score))
            .event(SessionEvent::OpponentGuessReceived { number })
            .event(SessionEvent::OpponentScoreSent { score, is_win });
        if is_win {
            self.end_match(&mut out, false);
        }
        out
    }

    fn on_tell(&mut self, score: Score) -> Output {
        let mut out = Output::default();
        let Some(state) = self.phase.match_state() else {
            tracing::debug!(phase = self.phase.label(), "ignoring tell");
            return out;
        };
        if state.role() != Role::Guesser {
            tracing::debug!(phase = self.phase.label(), "ignoring tell");
            return out;
        }

        let is_win = score.is_win(state.digit_count());
        out.event(SessionEvent::ScoreReceived { score, is_win });
        if is_win {
            self.end_match(&mut out, true);
        }
        out
    }

    fn end_match(&mut self, out: &mut Output, won: bool) {
        tracing::info!(won, "match ended");
        self.phase = Phase::Lobby;
        out.event(SessionEvent::MatchEnded { won });
    }

    // -----------------------------------------------------------------------
    // Local actions
    // -----------------------------------------------------------------------

    /// Starts a match as the guesser.
    ///
    /// # Errors
    /// - [`SessionError::Closed`] after disconnect
    /// - [`SessionError::InvalidAction`] outside the lobby
    /// - [`SessionError::InvalidDigitCount`] outside 1..=10
    /// - [`SessionError::UnknownOpponent`] if the name is not on the roster
    pub fn start_match(
        &mut self,
        digits: usize,
        opponent: Opponent,
    ) -> Result<Output, SessionError> {
        self.require_lobby("start a match")?;
        if !is_valid_digit_count(digits) {
            return Err(SessionError::InvalidDigitCount(digits));
        }

        let (ai, opponents) = match &opponent {
            Opponent::Ai => (true, Vec::new()),
            Opponent::Named(name) => {
                let id = self
                    .registry
                    .lookup_id_by_name(name)
                    .ok_or_else(|| SessionError::UnknownOpponent(name.clone()))?;
                (false, vec![id.clone()])
            }
        };

        let mut out = Output::default();
        out.send(ClientMessage::Play(PlaySettings {
            ai,
            digits,
            role: Role::Guesser,
            opponents: opponents.clone(),
        }))
        .event(SessionEvent::MatchStarted {
            role: Role::Guesser,
        });
        self.phase = Phase::InGame(MatchState::guessing(digits, opponents));
        tracing::info!(digits, ?opponent, "match started as guesser");
        Ok(out)
    }

    /// Sends a guess for the current match.
    ///
    /// # Errors
    /// - [`SessionError::Closed`] after disconnect
    /// - [`SessionError::InvalidAction`] unless guessing
    /// - [`SessionError::InvalidDigits`] if `number` is not a digit sequence
    pub fn submit_guess(&mut self, number: &str) -> Result<Output, SessionError> {
        if self.phase == Phase::Disconnected {
            return Err(SessionError::Closed);
        }
        let guessing = self
            .phase
            .match_state()
            .is_some_and(|state| state.role() == Role::Guesser);
        if !guessing {
            return Err(SessionError::InvalidAction {
                action: "guess",
                phase: self.phase.label(),
            });
        }

        let number = DigitSequence::parse(number.trim())?;
        let mut out = Output::default();
        out.send(ClientMessage::Guess {
            number: number.as_str().to_owned(),
        });
        Ok(out)
    }

    /// Gives up on the current match without a result. Does nothing
    /// outside a match.
    pub fn abandon_match(&mut self) -> Output {
        let mut out = Output::default();
        if self.phase.in_game() {
            tracing::warn!(phase = self.phase.label(), "match abandoned");
            self.phase = Phase::Lobby;
            out.event(SessionEvent::MatchAbandoned);
        }
        out
    }

    fn require_lobby(&self, action: &'static str) -> Result<(), SessionError> {
        match self.phase {
            Phase::Lobby => Ok(()),
            Phase::Disconnected => Err(SessionError::Closed),
            _ => Err(SessionError::InvalidAction {
                action,
                phase: self.phase.label(),
            }),
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
