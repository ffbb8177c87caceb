// src/handlers/stats.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::{
    error::AppError,
    models::user_stats::UserStats,
    state::AppState,
    utils::jwt::Claims,
};

/// Get the caller's quiz statistics. Zeroed until the first attempt.
#[utoipa::path(
    get,
    path = "/api/users/me/stats",
    responses((status = 200, description = "Caller's statistics", body = UserStats)),
    security(("bearer_auth" = [])),
    tag = "stats"
)]
pub async fn get_my_stats(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id();
    let stats = state
        .user_stats
        .get_stats(user_id)
        .await?
        .unwrap_or_else(|| UserStats::empty(user_id));

    Ok(Json(stats))
}

/// Get another user's quiz statistics.
#[utoipa::path(
    get,
    path = "/api/users/{user_id}/stats",
    params(("user_id" = String, Path, description = "User identifier")),
    responses(
        (status = 200, description = "User statistics", body = UserStats),
        (status = 404, description = "User has no statistics")
    ),
    tag = "stats"
)]
pub async fn get_user_stats(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let stats = state
        .user_stats
        .get_stats(&user_id)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    Ok(Json(stats))
}
