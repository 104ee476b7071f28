//! A connected player taking part in a match.
//!
//! [`RemotePlayer`] implements both [`Thinker`] and [`Guesser`] by sending
//! requests down the player's connection and waiting for the matching
//! reply. Replies are only awaited for as long as the reply timeout.

use std::time::Duration;

use cowbull_game::{GameError, Guesser, Thinker, is_valid_digit_count};
use cowbull_protocol::{ClientMessage, MessageName, Score, ServerMessage};
use tokio::time::Instant;

use crate::PlayerLink;

/// A player on the other end of a connection.
#[derive(Debug)]
pub struct RemotePlayer {
    link: PlayerLink,
    reply_timeout: Duration,
    digits_hint: Option<usize>,
}

impl RemotePlayer {
    pub fn new(link: PlayerLink, reply_timeout: Duration) -> Self {
        Self {
            link,
            reply_timeout,
            digits_hint: None,
        }
    }

    /// Suggests a digit count when asking this player to think. The
    /// player may ignore it.
    pub fn with_digits_hint(mut self, digits: usize) -> Self {
        self.digits_hint = Some(digits);
        self
    }

    fn label(&self) -> String {
        self.link.id().to_string()
    }

    /// Sends a message without waiting for anything back.
    fn notify(&self, msg: ServerMessage) -> Result<(), GameError> {
        if self.link.send(msg) {
            Ok(())
        } else {
            Err(GameError::PlayerGone(self.label()))
        }
    }

    /// Sends `request` and waits for a reply named `expected`.
    ///
    /// Replies left over from earlier exchanges are discarded first.
    /// Replies with other names that arrive while waiting are dropped.
    async fn request(
        &self,
        request: ServerMessage,
        expected: MessageName,
    ) -> Result<ClientMessage, GameError> {
        let mut replies = self.link.replies().lock().await;
        while let Ok(stale) = replies.try_recv() {
            tracing::debug!(player_id = %self.link.id(), name = stale.name(), "dropping stale reply");
        }

        self.notify(request)?;

        let deadline = Instant::now() + self.reply_timeout;
        loop {
            match tokio::time::timeout_at(deadline, replies.recv()).await {
                Err(_) => {
                    tracing::warn!(player_id = %self.link.id(), %expected, "reply timed out");
                    return Err(GameError::Timeout(self.label()));
                }
                Ok(None) => return Err(GameError::PlayerGone(self.label())),
                Ok(Some(reply)) if reply.name() == expected.as_str() => return Ok(reply),
                Ok(Some(other)) => {
                    tracing::debug!(
                        player_id = %self.link.id(),
                        %expected,
                        got = other.name(),
                        "dropping unexpected reply"
                    );
                }
            }
        }
    }

    fn unexpected(&self, reply: &ClientMessage) -> GameError {
        GameError::PlayerFailed {
            player: self.label(),
            reason: format!("unexpected reply {}", reply.name()),
        }
    }
}

impl Thinker for RemotePlayer {
    async fn think(&mut self) -> Result<usize, GameError> {
        let request = ServerMessage::ThinkRequest {
            digits: self.digits_hint,
        };
        match self.request(request, MessageName::Think).await? {
            ClientMessage::Think { digits } if is_valid_digit_count(digits) => Ok(digits),
            ClientMessage::Think { digits } => Err(GameError::InvalidDigitCount(digits)),
            other => Err(self.unexpected(&other)),
        }
    }

    async fn try_number(&mut self, number: &str) -> Result<Score, GameError> {
        let request = ServerMessage::TryRequest {
            number: number.to_owned(),
        };
        match self.request(request, MessageName::Try).await? {
            ClientMessage::TryResponse(score) => Ok(score),
            other => Err(self.unexpected(&other)),
        }
    }
}

impl Guesser for RemotePlayer {
    async fn guess(&mut self, digits: usize) -> Result<String, GameError> {
        match self
            .request(ServerMessage::GuessRequest { digits }, MessageName::Guess)
            .await?
        {
            ClientMessage::Guess { number } => Ok(number),
            other => Err(self.unexpected(&other)),
        }
    }

    async fn tell(&mut self, _number: &str, score: Score) -> Result<(), GameError> {
        self.notify(ServerMessage::Tell(score))
    }
}

// =========================================================================
// Tests
// =========================================================================
