//! Error types for the game layer.

/// Why a string is not a digit sequence.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DigitsError {
    #[error("digit sequence is empty")]
    Empty,

    #[error("'{0}' is not a digit")]
    NonDigit(char),
}

/// Errors from [`score`](crate::score).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScoreError {
    /// The guess and the secret have different lengths. There is no
    /// partial score for this case.
    #[error("length mismatch: secret has {secret} digits, guess has {guess}")]
    LengthMismatch { secret: usize, guess: usize },
}

/// Errors that end a match.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// Digit counts must be between 1 and [`MAX_DIGITS`](crate::MAX_DIGITS).
    #[error("invalid digit count {0}")]
    InvalidDigitCount(usize),

    /// The thinker was asked to score a guess before picking a number.
    #[error("thinker has no number yet")]
    NoSecret,

    /// A multi-player guesser was built with nobody in it.
    #[error("no guessers to ask")]
    NoPlayers,

    /// The reported scores contradict each other; no number fits them all.
    #[error("inconsistent answers: no number matches every score")]
    InconsistentAnswers,

    /// A remote player did not answer within the reply timeout.
    #[error("player {0} did not answer in time")]
    Timeout(String),

    /// A remote player's connection went away mid-match.
    #[error("player {0} left the game")]
    PlayerGone(String),

    /// Talking to a remote player failed.
    #[error("player {player} failed: {reason}")]
    PlayerFailed { player: String, reason: String },
}
