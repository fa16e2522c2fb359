//! Core types for the revision scheduler.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Minimum ease factor allowed by SM-2.
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// Ease factor assigned to a card that has never been reviewed.
pub const INITIAL_EASE_FACTOR: f64 = 2.5;

/// Per-card spaced repetition state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulingState {
    pub interval_days: i64,
    pub ease_factor: f64,
    /// Consecutive successful reviews since the last lapse.
    pub repetition_count: u32,
    /// `None` means the card has never been scheduled and is due now.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_review: Option<DateTime<Utc>>,
}

impl Default for SchedulingState {
    fn default() -> Self {
        Self {
            interval_days: 1,
            ease_factor: INITIAL_EASE_FACTOR,
            repetition_count: 0,
            next_review: None,
        }
    }
}

/// Self-assessed recall quality on the 0-5 SM-2 scale.
///
/// 0 is a total blackout, 5 is perfect recall. Construction validates the
/// range; a `Quality` in hand is always in bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Quality(u8);

impl Quality {
    /// Validate a raw 0-5 rating.
    pub fn new(value: u8) -> Result<Self> {
        if value > 5 {
            return Err(CoreError::InvalidQuality { value });
        }
        Ok(Self(value))
    }

    /// Derive quality from a correct/incorrect answer and the student's
    /// 1-5 self-reported difficulty (5 = hardest).
    ///
    /// Mapping: correct answers land in 3..=5 as `6 - difficulty` clamped
    /// to that range; incorrect answers land in 0..=2 as `2 - difficulty`
    /// saturating at 0. Correct therefore always means quality >= 3 and a
    /// lapse is exactly an incorrect answer.
    pub fn from_answer(was_correct: bool, difficulty_rating: u8) -> Result<Self> {
        if !(1..=5).contains(&difficulty_rating) {
            return Err(CoreError::InvalidDifficulty {
                value: difficulty_rating,
            });
        }
        let value = if was_correct {
            (6 - difficulty_rating).clamp(3, 5)
        } else {
            2u8.saturating_sub(difficulty_rating)
        };
        Ok(Self(value))
    }

    /// The raw 0-5 value.
    pub fn value(self) -> u8 {
        self.0
    }

    /// A quality below 3 is a lapse.
    pub fn is_lapse(self) -> bool {
        self.0 < 3
    }
}

/// Who produced a flashcard's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneratedBy {
    User,
    Ai,
    System,
}

impl Default for GeneratedBy {
    fn default() -> Self {
        Self::User
    }
}

impl GeneratedBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Ai => "ai",
            Self::System => "system",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Self::User),
            "ai" => Some(Self::Ai),
            "system" => Some(Self::System),
            _ => None,
        }
    }
}
