// src/models/attempt.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A submitted answer value. JSON numbers are option indexes, strings are option text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum GivenAnswer {
    Index(u32),
    Text(String),
}

/// One entry of a submission, recorded verbatim on the attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnswerEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_id: Option<String>,
    pub given: GivenAnswer,
}

impl AnswerEntry {
    pub fn by_index(question_index: u32, given: GivenAnswer) -> Self {
        Self {
            question_index: Some(question_index),
            question_id: None,
            given,
        }
    }

    pub fn by_id(question_id: impl Into<String>, given: GivenAnswer) -> Self {
        Self {
            question_index: None,
            question_id: Some(question_id.into()),
            given,
        }
    }
}

/// Represents the 'quiz_attempts' table. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Attempt {
    pub id: String,
    pub quiz_id: String,
    pub user_id: String,
    pub answers: Vec<AnswerEntry>,
    pub score: i64,
    pub created_at: DateTime<Utc>,
}

/// DTO for submitting a quiz attempt.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitAttemptRequest {
    pub answers: Vec<AnswerEntry>,
}

/// Result of a scored attempt.
/// `total` is the quiz's maximum possible score, not the user's cumulative score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AttemptResult {
    pub score: u32,
    pub total: u32,
}

/// Coarse rating of an attempt by percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum PerformanceBand {
    Excellent,
    Good,
    Fair,
    #[serde(rename = "Needs Practice")]
    NeedsPractice,
}

impl PerformanceBand {
    /// Bands on the unrounded percentage, so 89.7% is still `Good`.
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 90.0 {
            PerformanceBand::Excellent
        } else if percentage >= 70.0 {
            PerformanceBand::Good
        } else if percentage >= 50.0 {
            PerformanceBand::Fair
        } else {
            PerformanceBand::NeedsPractice
        }
    }
}

/// One row of a user's attempt history, joined with the quiz it belongs to.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AttemptHistoryEntry {
    pub attempt_id: String,
    pub quiz_id: String,
    pub quiz_title: String,
    pub subject: Option<String>,
    pub score: i64,
    pub total: i64,
    pub percentage: u32,
    pub status: PerformanceBand,
    pub attempted_at: DateTime<Utc>,
}

impl AttemptHistoryEntry {
    pub fn new(attempt: &Attempt, quiz_title: String, subject: Option<String>, total: i64) -> Self {
        let exact = if total > 0 {
            attempt.score as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        Self {
            attempt_id: attempt.id.clone(),
            quiz_id: attempt.quiz_id.clone(),
            quiz_title,
            subject,
            score: attempt.score,
            total,
            percentage: exact.round() as u32,
            status: PerformanceBand::from_percentage(exact),
            attempted_at: attempt.created_at,
        }
    }
}
