//! Validated digit sequences: secrets and guesses.

use std::fmt;
use std::str::FromStr;

use crate::DigitsError;

/// The longest number the game supports: every decimal digit once.
pub const MAX_DIGITS: usize = 10;

/// Returns `true` if `digits` is a playable digit count (1..=10).
pub fn is_valid_digit_count(digits: usize) -> bool {
    (1..=MAX_DIGITS).contains(&digits)
}

/// A non-empty string of ASCII digits.
///
/// Leading zeros are significant: `"0123"` has four digits.
/// Digits may repeat; scoring a secret with repeats follows the
/// first-occurrence rule described on [`score`](crate::score).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DigitSequence(String);

impl DigitSequence {
    /// Parses a digit sequence. Surrounding whitespace is not trimmed.
    ///
    /// # Errors
    /// [`DigitsError::Empty`] for `""`, [`DigitsError::NonDigit`] for the
    /// first character that is not `0-9`.
    pub fn parse(text: &str) -> Result<Self, DigitsError> {
        if text.is_empty() {
            return Err(DigitsError::Empty);
        }
        if let Some(bad) = text.chars().find(|c| !c.is_ascii_digit()) {
            return Err(DigitsError::NonDigit(bad));
        }
        Ok(Self(text.to_owned()))
    }

    /// Builds a sequence from bytes already known to be ASCII digits.
    pub(crate) fn from_digit_bytes(bytes: &[u8]) -> Self {
        debug_assert!(!bytes.is_empty() && bytes.iter().all(u8::is_ascii_digit));
        Self(bytes.iter().map(|&b| char::from(b)).collect())
    }

    /// Number of digits.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; a sequence has at least one digit.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl FromStr for DigitSequence {
    type Err = DigitsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for DigitSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DigitSequence {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
