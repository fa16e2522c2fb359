//! Error types for revision-core.

use thiserror::Error;

/// Result type alias using CoreError.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Scheduling input validation errors.
///
/// Out-of-range input is always rejected, never clamped, so the review
/// audit trail only ever records values a client actually sent.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("quality rating {value} is outside 0-5")]
    InvalidQuality { value: u8 },

    #[error("difficulty rating {value} is outside 1-5")]
    InvalidDifficulty { value: u8 },
}
