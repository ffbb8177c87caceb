// src/services/reconcile.rs

//! Maintenance operations that recompute quiz counters from the attempt records.

use crate::{
    models::quiz::AttemptCountAudit,
    repository::{AttemptStore, QuizRepository, StoreError},
};

/// Compares the stored `attempts_count` of a quiz with its attempt records.
pub async fn audit_attempt_count(
    quizzes: &dyn QuizRepository,
    attempts: &dyn AttemptStore,
    quiz_id: &str,
) -> Result<AttemptCountAudit, StoreError> {
    let quiz = quizzes.get_quiz(quiz_id).await?.ok_or(StoreError::NotFound)?;
    let recorded = attempts.count_for_quiz(quiz_id).await?;

    let audit = AttemptCountAudit {
        quiz_id: quiz.id,
        stored_attempts_count: quiz.attempts_count,
        recorded_attempts: recorded,
        drift: quiz.attempts_count - recorded,
    };
    if audit.drift != 0 {
        tracing::warn!(
            "Attempt counter drift on quiz {}: stored={} recorded={}",
            audit.quiz_id,
            audit.stored_attempts_count,
            audit.recorded_attempts
        );
    }
    Ok(audit)
}

/// Resets the stored counter to the number of attempt records.
/// Submissions racing with this call may leave a drift of their own; rerun the audit after.
pub async fn reconcile_attempt_count(
    quizzes: &dyn QuizRepository,
    attempts: &dyn AttemptStore,
    quiz_id: &str,
) -> Result<AttemptCountAudit, StoreError> {
    let before = audit_attempt_count(quizzes, attempts, quiz_id).await?;
    if before.drift == 0 {
        return Ok(before);
    }

    quizzes
        .set_attempt_count(quiz_id, before.recorded_attempts)
        .await?;
    tracing::info!(
        "Quiz {} attempt counter reset from {} to {}",
        quiz_id,
        before.stored_attempts_count,
        before.recorded_attempts
    );

    audit_attempt_count(quizzes, attempts, quiz_id).await
}
