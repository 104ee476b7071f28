//! The match loop.

use crate::{GameError, Guesser, Thinker};

/// How a finished match went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameOutcome {
    /// Digit count of the secret.
    pub digits: usize,
    /// Guesses it took, including the winning one.
    pub rounds: usize,
    /// The winning guess.
    pub number: String,
}

/// One thinker against one guesser.
///
/// ```rust
/// use cowbull_game::{AiGuesser, AiThinker, DigitSequence, Game};
///
/// # tokio_test_block(async {
/// let thinker = AiThinker::with_secret("4071".parse::<DigitSequence>().unwrap());
/// let guesser = AiGuesser::new(4).unwrap();
/// let outcome = Game::new(thinker, guesser).play().await.unwrap();
/// assert_eq!(outcome.number, "4071");
/// # });
/// # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
/// # }
/// ```
#[derive(Debug)]
pub struct Game<T, G> {
    thinker: T,
    guesser: G,
}

impl<T: Thinker, G: Guesser> Game<T, G> {
    pub fn new(thinker: T, guesser: G) -> Self {
        Self { thinker, guesser }
    }

    /// Runs the match to the end.
    ///
    /// The thinker picks a secret, then each round the guesser guesses,
    /// the thinker scores it, and the guesser is told the score. The match
    /// ends on the first score whose bulls equal the digit count.
    ///
    /// # Errors
    /// Any error from either player ends the match and is returned as-is.
    pub async fn play(mut self) -> Result<GameOutcome, GameError> {
        let digits = self.thinker.think().await?;
        tracing::debug!(digits, "match started");

        let mut rounds = 0;
        loop {
            let number = self.guesser.guess(digits).await?;
            let score = self.thinker.try_number(&number).await?;
            rounds += 1;
            self.guesser.tell(&number, score).await?;
            tracing::debug!(%number, %score, rounds, "round scored");

            if score.is_win(digits) {
                tracing::info!(digits, rounds, "match won");
                return Ok(GameOutcome {
                    digits,
                    rounds,
                    number,
                });
            }
        }
    }
}
