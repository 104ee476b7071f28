//! The two roles a match needs, as async traits.
//!
//! A player can be local (the AI players in [`ai`](crate::ai)) or remote
//! (a connected client answering over the wire). The match loop in
//! [`Game`](crate::Game) does not care which.

use std::future::Future;

use cowbull_protocol::Score;

use crate::GameError;

/// Picks a secret number and scores guesses against it.
///
/// # Example
///
/// ```rust
/// use std::future::Future;
/// use cowbull_game::{GameError, Thinker};
/// use cowbull_protocol::Score;
///
/// struct AlwaysSeven;
///
/// impl Thinker for AlwaysSeven {
///     fn think(&mut self) -> impl Future<Output = Result<usize, GameError>> + Send {
///         async { Ok(1) }
///     }
///
///     fn try_number(
///         &mut self,
///         number: &str,
///     ) -> impl Future<Output = Result<Score, GameError>> + Send {
///         let bulls = usize::from(number == "7");
///         async move { Ok(Score::new(0, bulls)) }
///     }
/// }
/// ```
pub trait Thinker: Send {
    /// Picks a new secret and returns how many digits it has.
    fn think(&mut self) -> impl Future<Output = Result<usize, GameError>> + Send;

    /// Scores `number` against the current secret.
    fn try_number(
        &mut self,
        number: &str,
    ) -> impl Future<Output = Result<Score, GameError>> + Send;
}

/// Proposes numbers and learns from their scores.
pub trait Guesser: Send {
    /// Returns the next guess for a secret of `digits` digits.
    fn guess(
        &mut self,
        digits: usize,
    ) -> impl Future<Output = Result<String, GameError>> + Send;

    /// Reports the score `number` got.
    fn tell(
        &mut self,
        number: &str,
        score: Score,
    ) -> impl Future<Output = Result<(), GameError>> + Send;
}
