//! Common test utilities and fixtures for integration tests.
//!
//! This module provides shared test infrastructure including:
//! - TestContext for setting up test environment with database
//! - Helper functions for creating test data
//! - Authentication helpers
//!
//! # Requirements
//! Integration tests require a PostgreSQL database (set DATABASE_URL env var).

pub mod fixtures;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use uuid::Uuid;

use revision_backend::db::Database;
use revision_backend::models::DbFlashcard;
use revision_backend::routes;
use revision_backend::services::revision::RevisionService;
use revision_backend::AppState;

/// Test context containing database connection and test server.
///
/// Use this to set up integration tests with a real database connection.
/// Requires DATABASE_URL environment variable to be set.
pub struct TestContext {
    pub db: Arc<Database>,
    app: Router,
}

impl TestContext {
    /// Create a new test context.
    ///
    /// # Panics
    /// Panics if DATABASE_URL is not set or database connection fails.
    pub async fn new() -> Self {
        dotenvy::dotenv().ok();

        let database_url =
            std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for integration tests");

        let db = Database::connect(&database_url)
            .await
            .expect("Failed to connect to test database");

        db.run_migrations()
            .await
            .expect("Failed to run migrations");

        let db = Arc::new(db);

        let state = AppState {
            revision: Arc::new(RevisionService::new(db.clone())),
            db: db.clone(),
        };

        let app = build_test_router(state);

        Self { db, app }
    }

    /// Get the router for use with axum-test.
    pub fn router(&self) -> Router {
        self.app.clone()
    }

    /// Create a test student and return its ID and token.
    pub async fn create_test_student(&self, name: Option<&str>) -> (Uuid, String) {
        let student = self
            .db
            .create_student(name)
            .await
            .expect("Failed to create test student");
        (student.id, student.token)
    }

    /// Insert a flashcard directly (the content store is a collaborator,
    /// not part of the revision API).
    pub async fn insert_flashcard(&self, card: &DbFlashcard) {
        self.db
            .insert_flashcard(card)
            .await
            .expect("Failed to insert test flashcard");
    }

    /// Format authorization header value.
    pub fn auth_header_value(token: &str) -> String {
        format!("Bearer {}", token)
    }

    /// Clean up test data for a student.
    ///
    /// Call this after tests to remove test data.
    pub async fn cleanup_student(&self, student_id: Uuid) {
        // Delete in order due to foreign keys
        let _ = sqlx::query("DELETE FROM review_history WHERE student_id = $1")
            .bind(student_id)
            .execute(self.db.pool())
            .await;

        let _ = sqlx::query("DELETE FROM review_sessions WHERE student_id = $1")
            .bind(student_id)
            .execute(self.db.pool())
            .await;

        let _ = sqlx::query("DELETE FROM flashcards WHERE student_id = $1")
            .bind(student_id)
            .execute(self.db.pool())
            .await;

        let _ = sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(student_id)
            .execute(self.db.pool())
            .await;
    }
}

/// Build the test router with all routes.
fn build_test_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/api/student/status", get(routes::student::status))
        .route("/api/revision/answer", post(routes::revision::submit_answer))
        .route("/api/revision/session", post(routes::revision::start_session))
        .route("/api/revision/progress", get(routes::revision::progress))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            routes::auth::auth_middleware,
        ));

    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/student/register", post(routes::student::register))
        .merge(protected_routes)
        .with_state(state)
}
