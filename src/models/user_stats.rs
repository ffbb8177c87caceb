// src/models/user_stats.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// Last score a user obtained on a quiz. One row per (user, quiz).
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow, ToSchema)]
pub struct QuizScore {
    pub quiz_id: String,
    pub score: i64,
    pub updated_at: DateTime<Utc>,
}

/// Aggregated statistics fed by quiz attempts.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct UserStats {
    pub user_id: String,
    /// Cumulative score across all attempts.
    pub total_score: i64,
    pub attempts_count: i64,
    pub quiz_scores: Vec<QuizScore>,
}

impl UserStats {
    pub fn empty(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            total_score: 0,
            attempts_count: 0,
            quiz_scores: Vec::new(),
        }
    }

    pub fn score_for(&self, quiz_id: &str) -> Option<i64> {
        self.quiz_scores
            .iter()
            .find(|qs| qs.quiz_id == quiz_id)
            .map(|qs| qs.score)
    }
}
