// src/handlers/attempt.rs

use std::collections::HashMap;

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::{
    error::AppError,
    models::{
        attempt::{Attempt, AttemptHistoryEntry, AttemptResult, SubmitAttemptRequest},
        quiz::Quiz,
    },
    state::AppState,
    utils::jwt::Claims,
};

/// Submits the caller's answers for a quiz and returns the score.
///
/// * Body must be `{ "answers": [...] }`; each entry names a question by `questionIndex` or
///   `questionId` and carries `given`.
/// * Every call records a new attempt, including resubmissions.
#[utoipa::path(
    post,
    path = "/api/quizzes/{quiz_id}/attempt",
    params(("quiz_id" = String, Path, description = "Quiz identifier")),
    request_body = SubmitAttemptRequest,
    responses(
        (status = 200, description = "Attempt scored", body = AttemptResult),
        (status = 400, description = "Malformed answers"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Quiz not found"),
        (status = 500, description = "Storage failure")
    ),
    security(("bearer_auth" = [])),
    tag = "attempts"
)]
pub async fn submit_attempt(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(quiz_id): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> Result<impl IntoResponse, AppError> {
    let req: SubmitAttemptRequest = serde_json::from_value(body)?;

    let result = state
        .engine
        .submit_attempt(&quiz_id, claims.user_id(), req.answers)
        .await?;

    Ok(Json(result))
}

/// Joins attempts with their quizzes. Attempts whose quiz no longer exists are skipped.
async fn build_history(
    state: &AppState,
    attempts: Vec<Attempt>,
) -> Result<Vec<AttemptHistoryEntry>, AppError> {
    let mut quizzes: HashMap<String, Option<Quiz>> = HashMap::new();
    let mut history = Vec::with_capacity(attempts.len());

    for attempt in attempts {
        if !quizzes.contains_key(&attempt.quiz_id) {
            let quiz = state.quizzes.get_quiz(&attempt.quiz_id).await?;
            quizzes.insert(attempt.quiz_id.clone(), quiz);
        }
        if let Some(Some(quiz)) = quizzes.get(&attempt.quiz_id) {
            history.push(AttemptHistoryEntry::new(
                &attempt,
                quiz.title.clone(),
                quiz.subject.clone(),
                i64::from(quiz.max_score()),
            ));
        }
    }

    Ok(history)
}

/// Lists the caller's attempts across all quizzes, newest first.
#[utoipa::path(
    get,
    path = "/api/quizzes/attempts/me",
    responses((status = 200, description = "Attempt history", body = [AttemptHistoryEntry])),
    security(("bearer_auth" = [])),
    tag = "attempts"
)]
pub async fn list_my_attempts(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let attempts = state.attempts.list_for_user(claims.user_id(), None).await.map_err(|e| {
        tracing::error!("Failed to list attempts for {}: {}", claims.user_id(), e);
        AppError::from(e)
    })?;

    Ok(Json(build_history(&state, attempts).await?))
}

/// Lists the caller's attempts on one quiz, newest first.
#[utoipa::path(
    get,
    path = "/api/quizzes/{quiz_id}/attempts",
    params(("quiz_id" = String, Path, description = "Quiz identifier")),
    responses(
        (status = 200, description = "Attempts on this quiz", body = [AttemptHistoryEntry]),
        (status = 404, description = "Quiz not found")
    ),
    security(("bearer_auth" = [])),
    tag = "attempts"
)]
pub async fn list_my_quiz_attempts(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(quiz_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    if state.quizzes.get_quiz(&quiz_id).await?.is_none() {
        return Err(AppError::NotFound("Quiz not found".to_string()));
    }

    let attempts = state
        .attempts
        .list_for_user(claims.user_id(), Some(quiz_id.as_str()))
        .await?;

    Ok(Json(build_history(&state, attempts).await?))
}
