use thiserror::Error;

use crate::identifier::{MAX_ID, MIN_ID};

/// Rejected search input. Nothing is fetched when this is returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("no number entered")]
    Empty,

    #[error("`{0}` is not a number")]
    NotANumber(String),

    #[error("{0} is outside {}..={}", MIN_ID, MAX_ID)]
    OutOfRange(i64),
}

/// Failure of one fetch cycle.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Transport error, timeout or non-success status on either endpoint.
    #[error("network failure: {0}")]
    Network(String),

    /// A response body did not have the expected shape.
    #[error("decode failure: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Decode(err.to_string())
    }
}
