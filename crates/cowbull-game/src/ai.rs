//! Computer players.
//!
//! [`AiThinker`] picks a random number of distinct digits with no leading
//! zero. [`AiGuesser`] keeps every number still consistent with the
//! scores it has been told and guesses one of them at random.

use std::future::{Future, ready};

use cowbull_protocol::Score;
use rand::Rng;
use rand::seq::SliceRandom;

use crate::{DigitSequence, GameError, Guesser, Thinker, is_valid_digit_count, score};

/// The digit alphabet candidates are built from.
const ALPHABET: &[u8; 10] = b"1234567890";

// ---------------------------------------------------------------------------
// AiThinker
// ---------------------------------------------------------------------------

/// A thinker that picks a random number.
#[derive(Debug)]
pub struct AiThinker {
    digits: usize,
    fixed: Option<DigitSequence>,
    secret: Option<DigitSequence>,
}

impl AiThinker {
    /// Creates a thinker that will pick `digits`-digit numbers.
    ///
    /// # Errors
    /// [`GameError::InvalidDigitCount`] outside 1..=10.
    pub fn new(digits: usize) -> Result<Self, GameError> {
        if !is_valid_digit_count(digits) {
            return Err(GameError::InvalidDigitCount(digits));
        }
        Ok(Self {
            digits,
            fixed: None,
            secret: None,
        })
    }

    /// Creates a thinker that always thinks of `secret`.
    pub fn with_secret(secret: DigitSequence) -> Self {
        Self {
            digits: secret.len(),
            fixed: Some(secret),
            secret: None,
        }
    }

    /// The current secret, if one has been picked.
    pub fn secret(&self) -> Option<&DigitSequence> {
        self.secret.as_ref()
    }
}

/// Picks `digits` distinct digits at random. The first digit is never
/// zero unless the number has a single digit.
pub fn random_number<R: Rng>(digits: usize, rng: &mut R) -> DigitSequence {
    let digits = digits.clamp(1, ALPHABET.len());
    let mut pool: Vec<u8> = (b'0'..=b'9').collect();
    pool.shuffle(rng);
    if digits > 1 && pool[0] == b'0' {
        let other = rng.random_range(1..digits);
        pool.swap(0, other);
    }
    DigitSequence::from_digit_bytes(&pool[..digits])
}

impl Thinker for AiThinker {
    fn think(&mut self) -> impl Future<Output = Result<usize, GameError>> + Send {
        let secret = match &self.fixed {
            Some(fixed) => fixed.clone(),
            None => random_number(self.digits, &mut rand::rng()),
        };
        tracing::debug!(digits = secret.len(), "AI thinker picked a number");
        let digits = secret.len();
        self.secret = Some(secret);
        ready(Ok(digits))
    }

    fn try_number(
        &mut self,
        number: &str,
    ) -> impl Future<Output = Result<Score, GameError>> + Send {
        let result = match &self.secret {
            None => Err(GameError::NoSecret),
            Some(secret) => Ok(score_or_zero(secret, number)),
        };
        ready(result)
    }
}

/// Scores a guess that came from another player. Anything that cannot be
/// scored (not digits, wrong length) counts as a miss.
pub fn score_or_zero(secret: &DigitSequence, number: &str) -> Score {
    let scored = DigitSequence::parse(number)
        .map_err(|e| e.to_string())
        .and_then(|guess| score(secret, &guess).map_err(|e| e.to_string()));
    match scored {
        Ok(result) => result,
        Err(reason) => {
            tracing::warn!(number, %reason, "unscorable guess, answering zero");
            Score::ZERO
        }
    }
}

// ---------------------------------------------------------------------------
// AiGuesser
// ---------------------------------------------------------------------------

/// A guesser that narrows down a candidate list.
///
/// Candidates are every arrangement of `digits` distinct digits. Each
/// `tell` drops the candidates that would not have produced the reported
/// score. For ten digits that is 3.6 million candidates up front.
#[derive(Debug)]
pub struct AiGuesser {
    digits: usize,
    candidates: Vec<DigitSequence>,
}

impl AiGuesser {
    /// Creates a guesser for `digits`-digit secrets.
    ///
    /// # Errors
    /// [`GameError::InvalidDigitCount`] outside 1..=10.
    pub fn new(digits: usize) -> Result<Self, GameError> {
        if !is_valid_digit_count(digits) {
            return Err(GameError::InvalidDigitCount(digits));
        }
        Ok(Self {
            digits,
            candidates: all_arrangements(digits),
        })
    }

    /// How many numbers are still possible.
    pub fn remaining(&self) -> usize {
        self.candidates.len()
    }

    /// Draws a random candidate for a `digits`-digit secret. Synchronous,
    /// and slow the first time for long numbers.
    ///
    /// # Errors
    /// [`GameError::InconsistentAnswers`] once no candidate is left.
    pub fn pick(&mut self, digits: usize) -> Result<String, GameError> {
        if digits != self.digits {
            // The thinker picked a different length than we were built for.
            if !is_valid_digit_count(digits) {
                return Err(GameError::InvalidDigitCount(digits));
            }
            tracing::debug!(from = self.digits, to = digits, "AI guesser restarting search");
            self.digits = digits;
            self.candidates = all_arrangements(digits);
        }
        if self.candidates.is_empty() {
            return Err(GameError::InconsistentAnswers);
        }
        let index = rand::rng().random_range(0..self.candidates.len());
        Ok(self.candidates.swap_remove(index).as_str().to_owned())
    }

    /// Drops the candidates that would not have scored `reported` against
    /// `number`.
    ///
    /// # Errors
    /// [`GameError::InconsistentAnswers`] when that leaves nothing.
    pub fn learn(&mut self, number: &str, reported: Score) -> Result<(), GameError> {
        let Ok(guess) = DigitSequence::parse(number) else {
            tracing::warn!(number, "told about a guess that is not a number, ignoring");
            return Ok(());
        };
        self.candidates
            .retain(|candidate| score(candidate, &guess).is_ok_and(|s| s == reported));
        tracing::trace!(remaining = self.candidates.len(), "AI guesser filtered candidates");
        if self.candidates.is_empty() && !reported.is_win(self.digits) {
            return Err(GameError::InconsistentAnswers);
        }
        Ok(())
    }
}

fn all_arrangements(len: usize) -> Vec<DigitSequence> {
    let mut out = Vec::new();
    let mut current = Vec::with_capacity(len);
    arrangements(len, &mut current, &mut out);
    out
}

/// Appends every arrangement of distinct digits of length `len` to `out`.
fn arrangements(len: usize, current: &mut Vec<u8>, out: &mut Vec<DigitSequence>) {
    if current.len() == len {
        out.push(DigitSequence::from_digit_bytes(current));
        return;
    }
    for &digit in ALPHABET {
        if !current.contains(&digit) {
            current.push(digit);
            arrangements(len, current, out);
            current.pop();
        }
    }
}

impl Guesser for AiGuesser {
    fn guess(
        &mut self,
        digits: usize,
    ) -> impl Future<Output = Result<String, GameError>> + Send {
        ready(self.pick(digits))
    }

    fn tell(
        &mut self,
        number: &str,
        score: Score,
    ) -> impl Future<Output = Result<(), GameError>> + Send {
        ready(self.learn(number, score))
    }
}

// =========================================================================
// Tests
// =========================================================================
