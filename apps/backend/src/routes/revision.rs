//! Revision endpoints

use axum::{
    extract::{Query, State},
    Extension, Json,
};

use crate::error::Result;
use crate::models::*;
use crate::routes::auth::AuthenticatedStudent;
use crate::AppState;

/// POST /api/revision/answer
pub async fn submit_answer(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedStudent>,
    Json(payload): Json<SubmitAnswerRequest>,
) -> Result<Json<AnswerResult>> {
    let result = state
        .revision
        .submit_answer(auth.student_id, payload)
        .await?;
    Ok(Json(result))
}

/// POST /api/revision/session
pub async fn start_session(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedStudent>,
    Json(payload): Json<StartSessionRequest>,
) -> Result<Json<StartSessionResponse>> {
    let session = state
        .revision
        .start_session(auth.student_id, payload)
        .await?;
    Ok(Json(session))
}

/// GET /api/revision/progress
pub async fn progress(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedStudent>,
    Query(query): Query<ProgressQuery>,
) -> Result<Json<RevisionProgressSummary>> {
    let summary = state
        .revision
        .get_progress(auth.student_id, query.subject_id)
        .await?;
    Ok(Json(summary))
}
