// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

use crate::repository::StoreError;

/// Global Application Error Enum.
/// Centralizes error handling and mapping to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    // 500 Internal Server Error
    InternalServerError(String),

    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized
    AuthError(String),

    // 403 Forbidden (e.g., reading another owner's answer keys)
    Forbidden(String),

    // 404 Not Found
    NotFound(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for AppError {}

/// Implements `IntoResponse` for `AppError`.
/// Converts the error into a JSON response with appropriate HTTP status code.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::AuthError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };
        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// The write that failed while applying an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageStep {
    QuizLoad,
    AttemptWrite,
    QuizCounter,
    UserStats,
}

impl fmt::Display for StorageStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let step = match self {
            StorageStep::QuizLoad => "quiz load",
            StorageStep::AttemptWrite => "attempt write",
            StorageStep::QuizCounter => "quiz counter",
            StorageStep::UserStats => "user stats",
        };
        f.write_str(step)
    }
}

/// Errors raised by the attempt engine.
#[derive(Debug)]
pub enum AttemptError {
    /// Referenced quiz does not exist. Nothing was written.
    NotFound(String),

    /// Submission shape is malformed. Nothing was written.
    Validation(String),

    /// A store call failed. Steps before `step` stay committed.
    Storage { step: StorageStep, message: String },
}

impl fmt::Display for AttemptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptError::NotFound(msg) => write!(f, "not found: {}", msg),
            AttemptError::Validation(msg) => write!(f, "validation failed: {}", msg),
            AttemptError::Storage { step, message } => {
                write!(f, "storage failure during {}: {}", step, message)
            }
        }
    }
}

impl std::error::Error for AttemptError {}

impl AttemptError {
    pub fn storage(step: StorageStep, err: StoreError) -> Self {
        AttemptError::Storage {
            step,
            message: err.to_string(),
        }
    }
}

impl From<AttemptError> for AppError {
    fn from(err: AttemptError) -> Self {
        match err {
            AttemptError::NotFound(msg) => AppError::NotFound(msg),
            AttemptError::Validation(msg) => AppError::BadRequest(msg),
            storage @ AttemptError::Storage { .. } => {
                AppError::InternalServerError(storage.to_string())
            }
        }
    }
}

/// Converts `StoreError` into `AppError`.
/// Allows using `?` operator on repository calls.
impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => AppError::NotFound("Resource not found".to_string()),
            StoreError::Database(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::BadRequest(err.to_string())
    }
}
