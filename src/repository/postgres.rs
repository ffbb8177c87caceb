// src/repository/postgres.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, types::Json};

use super::{AttemptStore, QuizRepository, StoreError, StoreResult, UserStatsRepository};
use crate::models::{
    attempt::{AnswerEntry, Attempt},
    quiz::{Question, Quiz, QuizSummary},
    user_stats::{QuizScore, UserStats},
};

/// Postgres-backed implementation of every repository trait.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Represents the 'quizzes' table. Questions are a JSONB array.
#[derive(sqlx::FromRow)]
struct QuizRow {
    id: String,
    owner_id: String,
    title: String,
    subject: Option<String>,
    grade: Option<String>,
    questions: Json<Vec<Question>>,
    attempts_count: i64,
    created_at: DateTime<Utc>,
}

impl From<QuizRow> for Quiz {
    fn from(row: QuizRow) -> Self {
        Quiz {
            id: row.id,
            owner_id: row.owner_id,
            title: row.title,
            subject: row.subject,
            grade: row.grade,
            questions: row.questions.0,
            attempts_count: row.attempts_count,
            created_at: row.created_at,
        }
    }
}

/// Represents the 'quiz_attempts' table. Answers are stored verbatim as JSONB.
#[derive(sqlx::FromRow)]
struct AttemptRow {
    id: String,
    quiz_id: String,
    user_id: String,
    answers: Json<Vec<AnswerEntry>>,
    score: i64,
    created_at: DateTime<Utc>,
}

impl From<AttemptRow> for Attempt {
    fn from(row: AttemptRow) -> Self {
        Attempt {
            id: row.id,
            quiz_id: row.quiz_id,
            user_id: row.user_id,
            answers: row.answers.0,
            score: row.score,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct StatsRow {
    total_score: i64,
    attempts_count: i64,
}

#[async_trait]
impl QuizRepository for PgStore {
    async fn create_quiz(&self, quiz: &Quiz) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO quizzes (id, owner_id, title, subject, grade, questions, attempts_count, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(&quiz.id)
        .bind(&quiz.owner_id)
        .bind(&quiz.title)
        .bind(&quiz.subject)
        .bind(&quiz.grade)
        .bind(Json(&quiz.questions))
        .bind(quiz.attempts_count)
        .bind(quiz.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_quizzes(&self) -> StoreResult<Vec<QuizSummary>> {
        let list = sqlx::query_as::<_, QuizSummary>(
            r#"
            SELECT
                id, owner_id, title, subject, grade,
                jsonb_array_length(questions)::BIGINT AS questions_count,
                attempts_count, created_at
            FROM quizzes
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(list)
    }

    async fn get_quiz(&self, quiz_id: &str) -> StoreResult<Option<Quiz>> {
        let row = sqlx::query_as::<_, QuizRow>(
            r#"
            SELECT id, owner_id, title, subject, grade, questions, attempts_count, created_at
            FROM quizzes
            WHERE id = $1
            "#,
        )
        .bind(quiz_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Quiz::from))
    }

    async fn increment_attempt_count(&self, quiz_id: &str) -> StoreResult<()> {
        let result = sqlx::query("UPDATE quizzes SET attempts_count = attempts_count + 1 WHERE id = $1")
            .bind(quiz_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn set_attempt_count(&self, quiz_id: &str, count: i64) -> StoreResult<()> {
        let result = sqlx::query("UPDATE quizzes SET attempts_count = $2 WHERE id = $1")
            .bind(quiz_id)
            .bind(count)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl UserStatsRepository for PgStore {
    async fn increment_stats(&self, user_id: &str, score_delta: i64) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_stats (user_id, total_score, attempts_count)
            VALUES ($1, $2, 1)
            ON CONFLICT (user_id) DO UPDATE SET
                total_score = user_stats.total_score + EXCLUDED.total_score,
                attempts_count = user_stats.attempts_count + 1,
                updated_at = NOW()
            "#,
        )
        .bind(user_id)
        .bind(score_delta)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn upsert_quiz_score(&self, user_id: &str, quiz_id: &str, score: i64) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_quiz_scores (user_id, quiz_id, score, updated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (user_id, quiz_id) DO UPDATE SET
                score = EXCLUDED.score,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(user_id)
        .bind(quiz_id)
        .bind(score)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_stats(&self, user_id: &str) -> StoreResult<Option<UserStats>> {
        let Some(row) = sqlx::query_as::<_, StatsRow>(
            "SELECT total_score, attempts_count FROM user_stats WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        else {
            return Ok(None);
        };

        let quiz_scores = sqlx::query_as::<_, QuizScore>(
            r#"
            SELECT quiz_id, score, updated_at
            FROM user_quiz_scores
            WHERE user_id = $1
            ORDER BY updated_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(UserStats {
            user_id: user_id.to_string(),
            total_score: row.total_score,
            attempts_count: row.attempts_count,
            quiz_scores,
        }))
    }
}

#[async_trait]
impl AttemptStore for PgStore {
    async fn create(&self, attempt: &Attempt) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO quiz_attempts (id, quiz_id, user_id, answers, score, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&attempt.id)
        .bind(&attempt.quiz_id)
        .bind(&attempt.user_id)
        .bind(Json(&attempt.answers))
        .bind(attempt.score)
        .bind(attempt.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_for_user(&self, user_id: &str, quiz_id: Option<&str>) -> StoreResult<Vec<Attempt>> {
        let rows = sqlx::query_as::<_, AttemptRow>(
            r#"
            SELECT id, quiz_id, user_id, answers, score, created_at
            FROM quiz_attempts
            WHERE user_id = $1
              AND ($2::TEXT IS NULL OR quiz_id = $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(quiz_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Attempt::from).collect())
    }

    async fn count_for_quiz(&self, quiz_id: &str) -> StoreResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM quiz_attempts WHERE quiz_id = $1")
            .bind(quiz_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
