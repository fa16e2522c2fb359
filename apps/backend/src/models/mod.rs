//! Database models and API types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// Re-export shared types from revision-core
pub use revision_core::types::{GeneratedBy, Quality, SchedulingState};
pub use revision_core::SessionCandidate;

// === Database Entity Types ===

/// Registered student (identity/ownership collaborator)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Student {
    pub id: Uuid,
    pub token: String,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}

/// Flashcard stored in PostgreSQL
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbFlashcard {
    pub id: Uuid,
    pub student_id: Uuid,
    pub subject_id: Option<Uuid>,
    pub curriculum_outcome_id: Option<Uuid>,
    pub source_note_id: Option<Uuid>,
    pub front_text: String,
    pub back_text: String,
    pub generated_by: String,
    pub generation_model: Option<String>,
    pub review_count: i32,
    pub correct_count: i32,
    pub mastery_percent: i32,
    pub interval_days: i32,
    pub ease_factor: f64,
    pub next_review: Option<DateTime<Utc>>,
    pub repetition_count: i32,
    pub difficulty_level: Option<i32>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DbFlashcard {
    /// Extract the SM-2 scheduling state
    pub fn scheduling_state(&self) -> SchedulingState {
        SchedulingState {
            interval_days: self.interval_days as i64,
            ease_factor: self.ease_factor,
            repetition_count: self.repetition_count as u32,
            next_review: self.next_review,
        }
    }
}

/// Lightweight card row loaded for session selection
#[derive(Debug, Clone, FromRow)]
pub struct SessionPoolRow {
    pub id: Uuid,
    pub next_review: Option<DateTime<Utc>>,
    pub review_count: i32,
    pub mastery_percent: i32,
    pub created_at: DateTime<Utc>,
}

impl SessionPoolRow {
    /// Convert to a revision-core session candidate
    pub fn to_candidate(&self) -> SessionCandidate {
        SessionCandidate {
            id: self.id,
            next_review: self.next_review,
            review_count: self.review_count.max(0) as u32,
            mastery_percent: self.mastery_percent.clamp(0, 100) as u8,
            created_at: self.created_at,
        }
    }
}

/// Review audit record (append-only, write-once)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbReviewHistory {
    pub id: Uuid,
    pub student_id: Uuid,
    pub flashcard_id: Uuid,
    pub session_id: Option<Uuid>,
    pub was_correct: bool,
    pub quality_rating: i32,
    pub response_time_seconds: Option<i32>,
    pub interval_before: i32,
    pub interval_after: i32,
    pub ease_before: f64,
    pub ease_after: f64,
    pub repetition_before: i32,
    pub repetition_after: i32,
    pub created_at: DateTime<Utc>,
}

/// Persisted review session
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbReviewSession {
    pub id: Uuid,
    pub student_id: Uuid,
    pub subject_id: Option<Uuid>,
    pub flashcard_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

// === API Request/Response Types ===

#[derive(Debug, Serialize, Deserialize)]
pub struct StudentRegisterRequest {
    pub name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StudentRegisterResponse {
    pub student_id: Uuid,
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StudentStatusResponse {
    pub student_id: Uuid,
    pub last_seen_at: DateTime<Utc>,
}

// Revision types

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitAnswerRequest {
    pub flashcard_id: Uuid,
    pub was_correct: bool,
    pub difficulty_rating: u8,
    pub response_time_seconds: Option<i32>,
    pub session_id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnswerResult {
    pub flashcard_id: Uuid,
    pub was_correct: bool,
    pub quality_rating: u8,
    pub new_interval: i64,
    pub new_ease_factor: f64,
    pub next_review: DateTime<Utc>,
    pub mastery_percent: u8,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StartSessionRequest {
    pub subject_id: Option<Uuid>,
    pub card_count: Option<i32>,
    pub include_new: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StartSessionResponse {
    pub session_id: Uuid,
    pub flashcard_ids: Vec<Uuid>,
    pub total_cards: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProgressQuery {
    pub subject_id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RevisionProgressSummary {
    pub total_flashcards: usize,
    pub cards_due: usize,
    pub cards_mastered: usize,
    pub overall_mastery_percent: u8,
    pub review_streak: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_review_date: Option<DateTime<Utc>>,
    pub total_reviews: usize,
}
