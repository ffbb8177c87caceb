// src/repository/mod.rs

//! Storage seams consumed by the handlers and the attempt engine.
//!
//! Each trait has a Postgres implementation (`postgres`) and an in-memory one (`memory`).
//! Counter updates are single atomic operations in both; no method does read-then-write
//! on a counter.

pub mod memory;
pub mod postgres;

use std::fmt;

use async_trait::async_trait;

use crate::models::{
    attempt::Attempt,
    quiz::{Quiz, QuizSummary},
    user_stats::UserStats,
};

/// Errors surfaced by a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The row an update targets does not exist.
    NotFound,
    /// The backend rejected or failed the operation.
    Database(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound => f.write_str("record not found"),
            StoreError::Database(msg) => write!(f, "database error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            other => StoreError::Database(other.to_string()),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait QuizRepository: Send + Sync {
    async fn create_quiz(&self, quiz: &Quiz) -> StoreResult<()>;

    /// Newest first.
    async fn list_quizzes(&self) -> StoreResult<Vec<QuizSummary>>;

    async fn get_quiz(&self, quiz_id: &str) -> StoreResult<Option<Quiz>>;

    /// Atomically adds 1 to `attempts_count`. `NotFound` if the quiz is gone.
    async fn increment_attempt_count(&self, quiz_id: &str) -> StoreResult<()>;

    /// Overwrites `attempts_count`. Maintenance only.
    async fn set_attempt_count(&self, quiz_id: &str, count: i64) -> StoreResult<()>;
}

#[async_trait]
pub trait UserStatsRepository: Send + Sync {
    /// Atomically adds `score_delta` to `total_score` and 1 to `attempts_count`,
    /// creating the stats row on first use.
    async fn increment_stats(&self, user_id: &str, score_delta: i64) -> StoreResult<()>;

    /// Replaces the user's score for `quiz_id`, or inserts it if absent.
    async fn upsert_quiz_score(&self, user_id: &str, quiz_id: &str, score: i64) -> StoreResult<()>;

    async fn get_stats(&self, user_id: &str) -> StoreResult<Option<UserStats>>;
}

#[async_trait]
pub trait AttemptStore: Send + Sync {
    async fn create(&self, attempt: &Attempt) -> StoreResult<()>;

    /// A user's attempts, newest first, optionally restricted to one quiz.
    async fn list_for_user(&self, user_id: &str, quiz_id: Option<&str>) -> StoreResult<Vec<Attempt>>;

    async fn count_for_quiz(&self, quiz_id: &str) -> StoreResult<i64>;
}
