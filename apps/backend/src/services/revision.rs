//! Revision service: orchestrates scheduling, mastery tracking, the review
//! audit ledger and session selection.
//!
//! Every submitted answer runs as one transaction: the flashcard state
//! update and the review_history insert commit together or not at all.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::db::Database;
use crate::error::{ApiError, Result};
use crate::models::*;
use revision_core::{compute_mastery, select_session, Quality, Sm2};

/// Cards with mastery at or above this count as mastered.
const MASTERY_THRESHOLD: i32 = 80;

/// Default review session size.
const DEFAULT_SESSION_SIZE: i32 = 10;

/// Largest allowed review session.
const MAX_SESSION_SIZE: i32 = 50;

/// Cap on rows scanned when building a session pool.
const MAX_POOL_SCAN: i64 = 1000;

/// Orchestrator for the spaced-repetition revision flow
#[derive(Clone)]
pub struct RevisionService {
    db: Arc<Database>,
    scheduler: Sm2,
}

impl RevisionService {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            db,
            scheduler: Sm2::default(),
        }
    }

    /// Record a review answer for a flashcard.
    ///
    /// Validates input before any state mutation, locks the card row,
    /// computes the SM-2 transition and writes the new state plus exactly
    /// one review_history row in the same transaction.
    pub async fn submit_answer(
        &self,
        student_id: Uuid,
        request: SubmitAnswerRequest,
    ) -> Result<AnswerResult> {
        if let Some(seconds) = request.response_time_seconds {
            if seconds < 0 {
                return Err(ApiError::Validation(format!(
                    "response_time_seconds must be non-negative, got {}",
                    seconds
                )));
            }
        }
        let quality = Quality::from_answer(request.was_correct, request.difficulty_rating)?;

        let mut tx = self.db.begin().await?;

        let card = Database::get_flashcard_for_update(&mut tx, request.flashcard_id)
            .await?
            .ok_or_else(|| {
                ApiError::NotFound(format!("flashcard {}", request.flashcard_id))
            })?;

        if card.student_id != student_id {
            tracing::warn!(
                flashcard_id = %card.id,
                requesting_student = %student_id,
                "rejected review of flashcard owned by another student"
            );
            return Err(ApiError::AccessDenied(
                "flashcard belongs to another student".to_string(),
            ));
        }

        let previous = card.scheduling_state();
        let now = Utc::now();
        let scheduled = self.scheduler.schedule(&previous, quality, now);

        let review_count = card.review_count + 1;
        let correct_count = card.correct_count + if request.was_correct { 1 } else { 0 };
        let mastery = compute_mastery(review_count as u32, correct_count as u32);

        Database::apply_review_state(
            &mut tx,
            card.id,
            &scheduled.new_state,
            review_count,
            correct_count,
            mastery as i32,
        )
        .await?;

        let history = DbReviewHistory {
            id: Uuid::new_v4(),
            student_id,
            flashcard_id: card.id,
            session_id: request.session_id,
            was_correct: request.was_correct,
            quality_rating: quality.value() as i32,
            response_time_seconds: request.response_time_seconds,
            interval_before: card.interval_days,
            interval_after: scheduled.new_state.interval_days as i32,
            ease_before: card.ease_factor,
            ease_after: scheduled.new_state.ease_factor,
            repetition_before: card.repetition_count,
            repetition_after: scheduled.new_state.repetition_count as i32,
            created_at: now,
        };
        Database::insert_review_history(&mut tx, &history).await?;

        tx.commit().await?;

        Ok(AnswerResult {
            flashcard_id: card.id,
            was_correct: request.was_correct,
            quality_rating: quality.value(),
            new_interval: scheduled.new_state.interval_days,
            new_ease_factor: scheduled.new_state.ease_factor,
            next_review: scheduled.next_review,
            mastery_percent: mastery,
        })
    }

    /// Build a review session from the student's card pool.
    ///
    /// An empty pool yields an empty session, not an error.
    pub async fn start_session(
        &self,
        student_id: Uuid,
        request: StartSessionRequest,
    ) -> Result<StartSessionResponse> {
        let card_count = request.card_count.unwrap_or(DEFAULT_SESSION_SIZE);
        if !(1..=MAX_SESSION_SIZE).contains(&card_count) {
            return Err(ApiError::Validation(format!(
                "card_count must be between 1 and {}, got {}",
                MAX_SESSION_SIZE, card_count
            )));
        }
        let include_new = request.include_new.unwrap_or(true);

        let pool = self
            .db
            .get_session_pool(student_id, request.subject_id, MAX_POOL_SCAN)
            .await?;
        let candidates: Vec<_> = pool.iter().map(|row| row.to_candidate()).collect();

        let flashcard_ids =
            select_session(&candidates, card_count as usize, include_new, Utc::now());

        let session_id = self
            .db
            .insert_review_session(student_id, request.subject_id, &flashcard_ids)
            .await?;

        tracing::debug!(
            %student_id,
            %session_id,
            selected = flashcard_ids.len(),
            pool = pool.len(),
            "started review session"
        );

        Ok(StartSessionResponse {
            session_id,
            total_cards: flashcard_ids.len(),
            flashcard_ids,
        })
    }

    /// Aggregate revision progress for a student, optionally per subject
    pub async fn get_progress(
        &self,
        student_id: Uuid,
        subject_id: Option<Uuid>,
    ) -> Result<RevisionProgressSummary> {
        let cards = self
            .db
            .get_card_stats(student_id, subject_id, MASTERY_THRESHOLD)
            .await?;
        let reviews = self.db.get_review_stats(student_id, subject_id).await?;
        let dates = self.db.get_review_dates(student_id, subject_id).await?;

        Ok(RevisionProgressSummary {
            total_flashcards: cards.total,
            cards_due: cards.due,
            cards_mastered: cards.mastered,
            overall_mastery_percent: cards.average_mastery.round().clamp(0.0, 100.0) as u8,
            review_streak: review_streak(&dates, Utc::now().date_naive()),
            last_review_date: reviews.last_review,
            total_reviews: reviews.total_reviews,
        })
    }
}

/// Count consecutive days with at least one review, ending today or
/// yesterday. `dates` must be distinct and sorted newest first.
fn review_streak(dates: &[NaiveDate], today: NaiveDate) -> u32 {
    let Some(&latest) = dates.first() else {
        return 0;
    };
    if today.signed_duration_since(latest).num_days() > 1 {
        return 0;
    }

    let mut streak = 0;
    let mut expected = latest;
    for &day in dates {
        if day != expected {
            break;
        }
        streak += 1;
        match expected.pred_opt() {
            Some(prev) => expected = prev,
            None => break,
        }
    }
    streak
}
