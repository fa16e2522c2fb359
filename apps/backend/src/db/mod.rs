//! PostgreSQL database operations

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, Row, Transaction};
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::*;

/// Database wrapper with connection pool
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

/// Aggregated card counts for progress reporting
#[derive(Debug, Clone)]
pub struct CardStats {
    pub total: usize,
    pub due: usize,
    pub mastered: usize,
    pub average_mastery: f64,
}

/// Aggregated review ledger stats for progress reporting
#[derive(Debug, Clone)]
pub struct ReviewStats {
    pub total_reviews: usize,
    pub last_review: Option<DateTime<Utc>>,
}

impl Database {
    /// Connect to PostgreSQL and create connection pool
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| ApiError::Migration(e.to_string()))?;
        Ok(())
    }

    /// Get the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Begin a transaction
    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>> {
        Ok(self.pool.begin().await?)
    }

    // === Student Repository ===

    /// Create a new student with generated token
    pub async fn create_student(&self, name: Option<&str>) -> Result<Student> {
        let token = Uuid::new_v4().to_string();
        let student = sqlx::query_as::<_, Student>(
            r#"
            INSERT INTO students (token, name)
            VALUES ($1, $2)
            RETURNING id, token, name, created_at, last_seen_at
            "#,
        )
        .bind(&token)
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(student)
    }

    /// Get student by token
    pub async fn get_student_by_token(&self, token: &str) -> Result<Option<Student>> {
        let student = sqlx::query_as::<_, Student>(
            r#"
            SELECT id, token, name, created_at, last_seen_at
            FROM students
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(student)
    }

    /// Update student last_seen_at timestamp
    pub async fn update_last_seen(&self, student_id: Uuid) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE students
            SET last_seen_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(student_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // === Flashcard Repository ===

    /// Insert a flashcard (content store collaborator, used by fixtures)
    pub async fn insert_flashcard(&self, card: &DbFlashcard) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO flashcards (id, student_id, subject_id, curriculum_outcome_id,
                                   source_note_id, front_text, back_text, generated_by,
                                   generation_model, review_count, correct_count,
                                   mastery_percent, interval_days, ease_factor, next_review,
                                   repetition_count, difficulty_level, tags, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                    $11, $12, $13, $14, $15, $16, $17, $18, $19, $20)
            "#,
        )
        .bind(card.id)
        .bind(card.student_id)
        .bind(card.subject_id)
        .bind(card.curriculum_outcome_id)
        .bind(card.source_note_id)
        .bind(&card.front_text)
        .bind(&card.back_text)
        .bind(&card.generated_by)
        .bind(&card.generation_model)
        .bind(card.review_count)
        .bind(card.correct_count)
        .bind(card.mastery_percent)
        .bind(card.interval_days)
        .bind(card.ease_factor)
        .bind(card.next_review)
        .bind(card.repetition_count)
        .bind(card.difficulty_level)
        .bind(&card.tags)
        .bind(card.created_at)
        .bind(card.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Get flashcard by ID
    pub async fn get_flashcard(&self, flashcard_id: Uuid) -> Result<Option<DbFlashcard>> {
        let card = sqlx::query_as::<_, DbFlashcard>(
            r#"
            SELECT id, student_id, subject_id, curriculum_outcome_id, source_note_id,
                   front_text, back_text, generated_by, generation_model,
                   review_count, correct_count, mastery_percent, interval_days,
                   ease_factor, next_review, repetition_count, difficulty_level,
                   tags, created_at, updated_at
            FROM flashcards
            WHERE id = $1
            "#,
        )
        .bind(flashcard_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(card)
    }

    /// Get flashcard by ID with a row lock, serializing concurrent reviews
    /// of the same card within the surrounding transaction
    pub async fn get_flashcard_for_update(
        tx: &mut Transaction<'static, Postgres>,
        flashcard_id: Uuid,
    ) -> Result<Option<DbFlashcard>> {
        let card = sqlx::query_as::<_, DbFlashcard>(
            r#"
            SELECT id, student_id, subject_id, curriculum_outcome_id, source_note_id,
                   front_text, back_text, generated_by, generation_model,
                   review_count, correct_count, mastery_percent, interval_days,
                   ease_factor, next_review, repetition_count, difficulty_level,
                   tags, created_at, updated_at
            FROM flashcards
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(flashcard_id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(card)
    }

    /// Write the post-review scheduling state and counters for a flashcard.
    /// Must run in the same transaction as the review_history insert.
    pub async fn apply_review_state(
        tx: &mut Transaction<'static, Postgres>,
        flashcard_id: Uuid,
        state: &SchedulingState,
        review_count: i32,
        correct_count: i32,
        mastery_percent: i32,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE flashcards
            SET interval_days = $2,
                ease_factor = $3,
                next_review = $4,
                repetition_count = $5,
                review_count = $6,
                correct_count = $7,
                mastery_percent = $8,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(flashcard_id)
        .bind(state.interval_days as i32)
        .bind(state.ease_factor)
        .bind(state.next_review)
        .bind(state.repetition_count as i32)
        .bind(review_count)
        .bind(correct_count)
        .bind(mastery_percent)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Get a student's card pool for session selection, optionally filtered
    /// by subject. The scan is capped to bound session-start latency.
    pub async fn get_session_pool(
        &self,
        student_id: Uuid,
        subject_id: Option<Uuid>,
        limit: i64,
    ) -> Result<Vec<SessionPoolRow>> {
        let rows = match subject_id {
            Some(subject) => {
                sqlx::query_as::<_, SessionPoolRow>(
                    r#"
                    SELECT id, next_review, review_count, mastery_percent, created_at
                    FROM flashcards
                    WHERE student_id = $1 AND subject_id = $2
                    ORDER BY next_review NULLS LAST
                    LIMIT $3
                    "#,
                )
                .bind(student_id)
                .bind(subject)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, SessionPoolRow>(
                    r#"
                    SELECT id, next_review, review_count, mastery_percent, created_at
                    FROM flashcards
                    WHERE student_id = $1
                    ORDER BY next_review NULLS LAST
                    LIMIT $2
                    "#,
                )
                .bind(student_id)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(rows)
    }

    // === Review History Repository ===
    //
    // Append-only ledger: insert is the only operation exposed.

    /// Insert a review history record in the same transaction as the
    /// flashcard state update
    pub async fn insert_review_history(
        tx: &mut Transaction<'static, Postgres>,
        review: &DbReviewHistory,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO review_history (id, student_id, flashcard_id, session_id,
                                       was_correct, quality_rating, response_time_seconds,
                                       interval_before, interval_after, ease_before, ease_after,
                                       repetition_before, repetition_after, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(review.id)
        .bind(review.student_id)
        .bind(review.flashcard_id)
        .bind(review.session_id)
        .bind(review.was_correct)
        .bind(review.quality_rating)
        .bind(review.response_time_seconds)
        .bind(review.interval_before)
        .bind(review.interval_after)
        .bind(review.ease_before)
        .bind(review.ease_after)
        .bind(review.repetition_before)
        .bind(review.repetition_after)
        .bind(review.created_at)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Get review history for a flashcard, newest first
    pub async fn get_review_history(
        &self,
        student_id: Uuid,
        flashcard_id: Uuid,
    ) -> Result<Vec<DbReviewHistory>> {
        let reviews = sqlx::query_as::<_, DbReviewHistory>(
            r#"
            SELECT id, student_id, flashcard_id, session_id, was_correct, quality_rating,
                   response_time_seconds, interval_before, interval_after,
                   ease_before, ease_after, repetition_before, repetition_after, created_at
            FROM review_history
            WHERE student_id = $1 AND flashcard_id = $2
            ORDER BY created_at DESC
            "#,
        )
        .bind(student_id)
        .bind(flashcard_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }

    // === Review Session Repository ===

    /// Persist a review session's ordered card list
    pub async fn insert_review_session(
        &self,
        student_id: Uuid,
        subject_id: Option<Uuid>,
        flashcard_ids: &[Uuid],
    ) -> Result<Uuid> {
        let session_id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO review_sessions (id, student_id, subject_id, flashcard_ids)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(session_id)
        .bind(student_id)
        .bind(subject_id)
        .bind(flashcard_ids)
        .execute(&self.pool)
        .await?;

        Ok(session_id)
    }

    // === Progress Queries ===

    /// Aggregate card counts for a student, optionally filtered by subject
    pub async fn get_card_stats(
        &self,
        student_id: Uuid,
        subject_id: Option<Uuid>,
        mastery_threshold: i32,
    ) -> Result<CardStats> {
        let row = match subject_id {
            Some(subject) => {
                sqlx::query(
                    r#"
                    SELECT
                        COUNT(*)::INT as total_cards,
                        COUNT(CASE WHEN next_review IS NULL OR next_review <= NOW() THEN 1 END)::INT as due_cards,
                        COUNT(CASE WHEN mastery_percent >= $3 THEN 1 END)::INT as mastered_cards,
                        COALESCE(AVG(mastery_percent), 0)::FLOAT8 as average_mastery
                    FROM flashcards
                    WHERE student_id = $1 AND subject_id = $2
                    "#,
                )
                .bind(student_id)
                .bind(subject)
                .bind(mastery_threshold)
                .fetch_one(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    r#"
                    SELECT
                        COUNT(*)::INT as total_cards,
                        COUNT(CASE WHEN next_review IS NULL OR next_review <= NOW() THEN 1 END)::INT as due_cards,
                        COUNT(CASE WHEN mastery_percent >= $2 THEN 1 END)::INT as mastered_cards,
                        COALESCE(AVG(mastery_percent), 0)::FLOAT8 as average_mastery
                    FROM flashcards
                    WHERE student_id = $1
                    "#,
                )
                .bind(student_id)
                .bind(mastery_threshold)
                .fetch_one(&self.pool)
                .await?
            }
        };

        Ok(CardStats {
            total: row.get::<i32, _>("total_cards") as usize,
            due: row.get::<i32, _>("due_cards") as usize,
            mastered: row.get::<i32, _>("mastered_cards") as usize,
            average_mastery: row.get("average_mastery"),
        })
    }

    /// Aggregate review ledger stats for a student, optionally filtered by subject
    pub async fn get_review_stats(
        &self,
        student_id: Uuid,
        subject_id: Option<Uuid>,
    ) -> Result<ReviewStats> {
        let row = match subject_id {
            Some(subject) => {
                sqlx::query(
                    r#"
                    SELECT COUNT(*)::BIGINT as total_reviews, MAX(r.created_at) as last_review
                    FROM review_history r
                    JOIN flashcards f ON r.flashcard_id = f.id
                    WHERE r.student_id = $1 AND f.subject_id = $2
                    "#,
                )
                .bind(student_id)
                .bind(subject)
                .fetch_one(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    r#"
                    SELECT COUNT(*)::BIGINT as total_reviews, MAX(created_at) as last_review
                    FROM review_history
                    WHERE student_id = $1
                    "#,
                )
                .bind(student_id)
                .fetch_one(&self.pool)
                .await?
            }
        };

        Ok(ReviewStats {
            total_reviews: row.get::<i64, _>("total_reviews") as usize,
            last_review: row.get("last_review"),
        })
    }

    /// Distinct days with at least one review, newest first (bounded to a year)
    pub async fn get_review_dates(
        &self,
        student_id: Uuid,
        subject_id: Option<Uuid>,
    ) -> Result<Vec<NaiveDate>> {
        let dates = match subject_id {
            Some(subject) => {
                sqlx::query_scalar(
                    r#"
                    SELECT DISTINCT (r.created_at AT TIME ZONE 'UTC')::DATE as review_day
                    FROM review_history r
                    JOIN flashcards f ON r.flashcard_id = f.id
                    WHERE r.student_id = $1 AND f.subject_id = $2
                    ORDER BY review_day DESC
                    LIMIT 366
                    "#,
                )
                .bind(student_id)
                .bind(subject)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_scalar(
                    r#"
                    SELECT DISTINCT (created_at AT TIME ZONE 'UTC')::DATE as review_day
                    FROM review_history
                    WHERE student_id = $1
                    ORDER BY review_day DESC
                    LIMIT 366
                    "#,
                )
                .bind(student_id)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(dates)
    }
}
