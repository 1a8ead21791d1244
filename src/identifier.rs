//! Creature identifiers and the search-box validator.

use std::fmt;

use rand::Rng;

use crate::error::ValidationError;

pub const MIN_ID: u32 = 1;
pub const MAX_ID: u32 = 809;

/// A national dex number in `MIN_ID..=MAX_ID`.
///
/// Only [`validate`] and [`Identifier::random`] build one, so anything that
/// reaches the fetcher is already in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier(u32);

impl Identifier {
    /// Uniformly random identifier drawn from `rng`.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Identifier(rng.random_range(MIN_ID..=MAX_ID))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl TryFrom<i64> for Identifier {
    type Error = ValidationError;

    fn try_from(n: i64) -> Result<Self, Self::Error> {
        if n < MIN_ID as i64 || n > MAX_ID as i64 {
            return Err(ValidationError::OutOfRange(n));
        }
        Ok(Identifier(n as u32))
    }
}

/// Parse what the user typed into the search box.
pub fn validate(raw: &str) -> Result<Identifier, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty);
    }
    let n: i64 = trimmed
        .parse()
        .map_err(|_| ValidationError::NotANumber(trimmed.to_string()))?;
    Identifier::try_from(n)
}
