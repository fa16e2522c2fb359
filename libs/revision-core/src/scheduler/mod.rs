//! Spaced repetition scheduling.

pub mod sm2;

use chrono::{DateTime, Utc};

use crate::types::SchedulingState;

/// Result of scheduling a card after a review.
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulingResult {
    pub new_state: SchedulingState,
    pub next_review: DateTime<Utc>,
}
