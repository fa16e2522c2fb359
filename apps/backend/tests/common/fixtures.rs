//! Test fixtures and factory functions for creating test data.

use chrono::{Duration, Utc};
use serde_json::json;
use uuid::Uuid;

use revision_backend::models::DbFlashcard;

/// A flashcard that has never been reviewed.
pub fn new_flashcard(student_id: Uuid) -> DbFlashcard {
    let now = Utc::now();
    DbFlashcard {
        id: Uuid::new_v4(),
        student_id,
        subject_id: None,
        curriculum_outcome_id: None,
        source_note_id: None,
        front_text: "What is the powerhouse of the cell?".to_string(),
        back_text: "The mitochondrion".to_string(),
        generated_by: "user".to_string(),
        generation_model: None,
        review_count: 0,
        correct_count: 0,
        mastery_percent: 0,
        interval_days: 1,
        ease_factor: 2.5,
        next_review: None,
        repetition_count: 0,
        difficulty_level: None,
        tags: vec![],
        created_at: now,
        updated_at: now,
    }
}

/// A reviewed flashcard that became due `days_overdue` days ago.
pub fn overdue_flashcard(student_id: Uuid, days_overdue: i64, mastery_percent: i32) -> DbFlashcard {
    let now = Utc::now();
    DbFlashcard {
        review_count: 4,
        correct_count: 3,
        mastery_percent,
        interval_days: 6,
        ease_factor: 2.5,
        next_review: Some(now - Duration::days(days_overdue)),
        repetition_count: 2,
        ..new_flashcard(student_id)
    }
}

/// A reviewed flashcard due `days_ahead` days from now.
pub fn upcoming_flashcard(student_id: Uuid, days_ahead: i64) -> DbFlashcard {
    let now = Utc::now();
    DbFlashcard {
        review_count: 4,
        correct_count: 4,
        mastery_percent: 100,
        interval_days: 6,
        ease_factor: 2.5,
        next_review: Some(now + Duration::days(days_ahead)),
        repetition_count: 2,
        ..new_flashcard(student_id)
    }
}

/// Submit answer request body.
pub fn submit_answer_request(
    flashcard_id: Uuid,
    was_correct: bool,
    difficulty_rating: u8,
) -> serde_json::Value {
    json!({
        "flashcard_id": flashcard_id,
        "was_correct": was_correct,
        "difficulty_rating": difficulty_rating,
    })
}

/// Start session request body.
pub fn start_session_request(card_count: i32, include_new: bool) -> serde_json::Value {
    json!({
        "card_count": card_count,
        "include_new": include_new,
    })
}
