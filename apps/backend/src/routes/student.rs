//! Student registration and status endpoints

use axum::{extract::State, Extension, Json};

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::routes::auth::AuthenticatedStudent;
use crate::AppState;

/// POST /api/student/register
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<StudentRegisterRequest>,
) -> Result<Json<StudentRegisterResponse>> {
    let student = state.db.create_student(payload.name.as_deref()).await?;

    tracing::info!(student_id = %student.id, "registered student");

    Ok(Json(StudentRegisterResponse {
        student_id: student.id,
        token: student.token,
    }))
}

/// GET /api/student/status
pub async fn status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedStudent>,
) -> Result<Json<StudentStatusResponse>> {
    let student = state
        .db
        .get_student_by_token(&auth.token)
        .await?
        .ok_or_else(|| ApiError::NotFound("student".to_string()))?;

    Ok(Json(StudentStatusResponse {
        student_id: student.id,
        last_seen_at: student.last_seen_at,
    }))
}
