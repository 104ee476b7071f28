//! The scoring rule.

use cowbull_protocol::Score;

use crate::{DigitSequence, ScoreError};

/// Scores `guess` against `secret`.
///
/// For each position `i` of the guess, find the *first* position `j`
/// where the guessed digit occurs in the secret. `j == i` is a bull;
/// any other `j` is a cow; no occurrence scores nothing.
///
/// When the secret has no repeated digits this is the usual bulls and
/// cows count. When it does, the first-occurrence lookup has two
/// visible effects, both kept on purpose because they are the game's
/// observable behavior:
///
/// - a repeated digit sitting in its *second* place is a cow, not a
///   bull, so guessing `1123` against `1123` scores 3 bulls and 1 cow;
/// - one secret digit can be credited as a cow to several guess
///   positions (`1111` against `1123` scores 1 bull and 3 cows).
///
/// # Errors
/// [`ScoreError::LengthMismatch`] when the lengths differ.
///
/// ```rust
/// use cowbull_game::{DigitSequence, score};
///
/// let secret: DigitSequence = "1234".parse().unwrap();
/// let guess: DigitSequence = "1243".parse().unwrap();
/// let s = score(&secret, &guess).unwrap();
/// assert_eq!((s.cows, s.bulls), (2, 2));
/// ```
pub fn score(secret: &DigitSequence, guess: &DigitSequence) -> Result<Score, ScoreError> {
    if secret.len() != guess.len() {
        return Err(ScoreError::LengthMismatch {
            secret: secret.len(),
            guess: guess.len(),
        });
    }

    let secret = secret.as_bytes();
    let mut result = Score::ZERO;
    for (i, digit) in guess.as_bytes().iter().enumerate() {
        match secret.iter().position(|d| d == digit) {
            Some(j) if j == i => result.bulls += 1,
            Some(_) => result.cows += 1,
            None => {}
        }
    }
    Ok(result)
}
