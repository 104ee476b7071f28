//! # cowbull-game
//!
//! The game itself, independent of any network: digit sequences, the
//! scoring rule, the [`Thinker`] and [`Guesser`] roles, computer players
//! for both, and the [`Game`] loop that referees a match.
//!
//! ```rust
//! use cowbull_game::{DigitSequence, score};
//!
//! let secret: DigitSequence = "5183".parse().unwrap();
//! let guess: DigitSequence = "1283".parse().unwrap();
//! let result = score(&secret, &guess).unwrap();
//! assert_eq!(result.to_string(), "1 cows and 2 bulls");
//! ```

#![allow(async_fn_in_trait)]

pub mod ai;
mod digits;
mod error;
mod game;
mod multi;
mod player;
mod score;

pub use ai::{AiGuesser, AiThinker, score_or_zero};
pub use digits::{DigitSequence, MAX_DIGITS, is_valid_digit_count};
pub use error::{DigitsError, GameError, ScoreError};
pub use game::{Game, GameOutcome};
pub use multi::MultiGuesser;
pub use player::{Guesser, Thinker};
pub use score::score;
