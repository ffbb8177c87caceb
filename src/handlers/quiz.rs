// src/handlers/quiz.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError,
    models::quiz::{AttemptCountAudit, CreateQuizRequest, Quiz, QuizSummary, QuizView},
    services::reconcile::{audit_attempt_count, reconcile_attempt_count},
    state::AppState,
    utils::jwt::Claims,
};

/// Loads a quiz or fails with 404.
async fn load_quiz(state: &AppState, quiz_id: &str) -> Result<Quiz, AppError> {
    state
        .quizzes
        .get_quiz(quiz_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch quiz {}: {}", quiz_id, e);
            AppError::from(e)
        })?
        .ok_or(AppError::NotFound("Quiz not found".to_string()))
}

/// Loads a quiz and checks the caller owns it.
async fn load_owned_quiz(state: &AppState, claims: &Claims, quiz_id: &str) -> Result<Quiz, AppError> {
    let quiz = load_quiz(state, quiz_id).await?;
    if !quiz.is_owned_by(claims.user_id()) {
        return Err(AppError::Forbidden("Only the quiz owner can do this".to_string()));
    }
    Ok(quiz)
}

/// Creates a quiz owned by the caller.
///
/// * Validates shape (question and option counts, text lengths).
/// * Rejects answer keys of the wrong kind for this deployment or not matching an option.
#[utoipa::path(
    post,
    path = "/api/quizzes",
    request_body = CreateQuizRequest,
    responses(
        (status = 201, description = "Quiz created", body = QuizView),
        (status = 400, description = "Invalid quiz definition"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = [])),
    tag = "quizzes"
)]
pub async fn create_quiz(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<serde_json::Value>,
) -> Result<impl IntoResponse, AppError> {
    let payload: CreateQuizRequest = serde_json::from_value(body)?;
    payload.validate()?;
    payload
        .check_answer_keys(state.config.answer_key_mode)
        .map_err(AppError::BadRequest)?;

    let quiz = payload.into_quiz(claims.user_id());
    state.quizzes.create_quiz(&quiz).await.map_err(|e| {
        tracing::error!("Failed to create quiz: {}", e);
        AppError::from(e)
    })?;

    tracing::info!(
        "Quiz {} created by {} with {} questions",
        quiz.id,
        quiz.owner_id,
        quiz.questions.len()
    );

    Ok((StatusCode::CREATED, Json(QuizView::from(quiz))))
}

/// Lists all quizzes, newest first.
#[utoipa::path(
    get,
    path = "/api/quizzes",
    responses((status = 200, description = "Quiz summaries", body = [QuizSummary])),
    tag = "quizzes"
)]
pub async fn list_quizzes(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let list = state.quizzes.list_quizzes().await.map_err(|e| {
        tracing::error!("Failed to list quizzes: {}", e);
        AppError::from(e)
    })?;

    Ok(Json(list))
}

/// Returns a quiz without its answer keys.
#[utoipa::path(
    get,
    path = "/api/quizzes/{quiz_id}",
    params(("quiz_id" = String, Path, description = "Quiz identifier")),
    responses(
        (status = 200, description = "Quiz for takers", body = QuizView),
        (status = 404, description = "Quiz not found")
    ),
    tag = "quizzes"
)]
pub async fn get_quiz(
    State(state): State<AppState>,
    Path(quiz_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = load_quiz(&state, &quiz_id).await?;
    Ok(Json(QuizView::from(quiz)))
}

/// Returns the full quiz including answer keys. Owner only.
#[utoipa::path(
    get,
    path = "/api/quizzes/{quiz_id}/answers",
    params(("quiz_id" = String, Path, description = "Quiz identifier")),
    responses(
        (status = 200, description = "Quiz with answer keys", body = Quiz),
        (status = 403, description = "Caller is not the owner"),
        (status = 404, description = "Quiz not found")
    ),
    security(("bearer_auth" = [])),
    tag = "quizzes"
)]
pub async fn get_quiz_answers(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(quiz_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = load_owned_quiz(&state, &claims, &quiz_id).await?;
    Ok(Json(quiz))
}

/// Compares the quiz's attempt counter with its attempt records. Owner only.
#[utoipa::path(
    get,
    path = "/api/quizzes/{quiz_id}/audit",
    params(("quiz_id" = String, Path, description = "Quiz identifier")),
    responses((status = 200, description = "Counter audit", body = AttemptCountAudit)),
    security(("bearer_auth" = [])),
    tag = "quizzes"
)]
pub async fn audit_quiz(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(quiz_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    load_owned_quiz(&state, &claims, &quiz_id).await?;
    let audit = audit_attempt_count(state.quizzes.as_ref(), state.attempts.as_ref(), &quiz_id).await?;
    Ok(Json(audit))
}

/// Resets the quiz's attempt counter to the number of attempt records. Owner only.
#[utoipa::path(
    post,
    path = "/api/quizzes/{quiz_id}/reconcile",
    params(("quiz_id" = String, Path, description = "Quiz identifier")),
    responses((status = 200, description = "Counter after reconciliation", body = AttemptCountAudit)),
    security(("bearer_auth" = [])),
    tag = "quizzes"
)]
pub async fn reconcile_quiz(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(quiz_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    load_owned_quiz(&state, &claims, &quiz_id).await?;
    let audit =
        reconcile_attempt_count(state.quizzes.as_ref(), state.attempts.as_ref(), &quiz_id).await?;
    Ok(Json(audit))
}
