// src/repository/memory.rs

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use super::{AttemptStore, QuizRepository, StoreError, StoreResult, UserStatsRepository};
use crate::models::{
    attempt::Attempt,
    quiz::{Quiz, QuizSummary},
    user_stats::{QuizScore, UserStats},
};

#[derive(Default)]
struct Inner {
    quizzes: HashMap<String, Quiz>,
    /// Insertion order.
    attempts: Vec<Attempt>,
    stats: HashMap<String, UserStats>,
}

/// Process-local store used with `STORAGE_BACKEND=memory` and in tests.
/// Every operation runs inside one critical section, so increments and upserts are atomic.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QuizRepository for MemoryStore {
    async fn create_quiz(&self, quiz: &Quiz) -> StoreResult<()> {
        let mut inner = self.inner.lock().await;
        if inner.quizzes.contains_key(&quiz.id) {
            return Err(StoreError::Database(format!("duplicate quiz id '{}'", quiz.id)));
        }
        inner.quizzes.insert(quiz.id.clone(), quiz.clone());
        Ok(())
    }

    async fn list_quizzes(&self) -> StoreResult<Vec<QuizSummary>> {
        let inner = self.inner.lock().await;
        let mut list: Vec<QuizSummary> = inner.quizzes.values().map(QuizSummary::from).collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(list)
    }

    async fn get_quiz(&self, quiz_id: &str) -> StoreResult<Option<Quiz>> {
        Ok(self.inner.lock().await.quizzes.get(quiz_id).cloned())
    }

    async fn increment_attempt_count(&self, quiz_id: &str) -> StoreResult<()> {
        let mut inner = self.inner.lock().await;
        let quiz = inner.quizzes.get_mut(quiz_id).ok_or(StoreError::NotFound)?;
        quiz.attempts_count += 1;
        Ok(())
    }

    async fn set_attempt_count(&self, quiz_id: &str, count: i64) -> StoreResult<()> {
        let mut inner = self.inner.lock().await;
        let quiz = inner.quizzes.get_mut(quiz_id).ok_or(StoreError::NotFound)?;
        quiz.attempts_count = count;
        Ok(())
    }
}

#[async_trait]
impl UserStatsRepository for MemoryStore {
    async fn increment_stats(&self, user_id: &str, score_delta: i64) -> StoreResult<()> {
        let mut inner = self.inner.lock().await;
        let stats = inner
            .stats
            .entry(user_id.to_string())
            .or_insert_with(|| UserStats::empty(user_id));
        stats.total_score += score_delta;
        stats.attempts_count += 1;
        Ok(())
    }

    async fn upsert_quiz_score(&self, user_id: &str, quiz_id: &str, score: i64) -> StoreResult<()> {
        let mut inner = self.inner.lock().await;
        let stats = inner
            .stats
            .entry(user_id.to_string())
            .or_insert_with(|| UserStats::empty(user_id));
        let now = Utc::now();
        match stats.quiz_scores.iter_mut().find(|qs| qs.quiz_id == quiz_id) {
            Some(existing) => {
                existing.score = score;
                existing.updated_at = now;
            }
            None => stats.quiz_scores.push(QuizScore {
                quiz_id: quiz_id.to_string(),
                score,
                updated_at: now,
            }),
        }
        Ok(())
    }

    async fn get_stats(&self, user_id: &str) -> StoreResult<Option<UserStats>> {
        Ok(self.inner.lock().await.stats.get(user_id).cloned())
    }
}

#[async_trait]
impl AttemptStore for MemoryStore {
    async fn create(&self, attempt: &Attempt) -> StoreResult<()> {
        let mut inner = self.inner.lock().await;
        if !inner.quizzes.contains_key(&attempt.quiz_id) {
            return Err(StoreError::Database(format!(
                "attempt references unknown quiz '{}'",
                attempt.quiz_id
            )));
        }
        inner.attempts.push(attempt.clone());
        Ok(())
    }

    async fn list_for_user(&self, user_id: &str, quiz_id: Option<&str>) -> StoreResult<Vec<Attempt>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .attempts
            .iter()
            .rev()
            .filter(|a| a.user_id == user_id)
            .filter(|a| quiz_id.is_none_or(|q| a.quiz_id == q))
            .cloned()
            .collect())
    }

    async fn count_for_quiz(&self, quiz_id: &str) -> StoreResult<i64> {
        let inner = self.inner.lock().await;
        Ok(inner.attempts.iter().filter(|a| a.quiz_id == quiz_id).count() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::quiz::{AnswerKey, Question};

    fn sample_quiz(id: &str) -> Quiz {
        Quiz {
            id: id.to_string(),
            owner_id: "owner".to_string(),
            title: "Sample".to_string(),
            subject: None,
            grade: None,
            questions: vec![Question {
                id: "q0".to_string(),
                prompt: "2 + 2?".to_string(),
                options: vec!["3".to_string(), "4".to_string()],
                answer: AnswerKey::Value("4".to_string()),
                image: None,
            }],
            attempts_count: 0,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn get_quiz_is_idempotent() {
        let store = MemoryStore::new();
        store.create_quiz(&sample_quiz("quiz-1")).await.unwrap();

        let first = store.get_quiz("quiz-1").await.unwrap().unwrap();
        let second = store.get_quiz("quiz-1").await.unwrap().unwrap();
        assert_eq!(first.questions, second.questions);
        assert!(store.get_quiz("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn increment_on_missing_quiz_is_not_found() {
        let store = MemoryStore::new();
        assert_eq!(
            store.increment_attempt_count("missing").await,
            Err(StoreError::NotFound)
        );
    }

    #[tokio::test]
    async fn duplicate_quiz_id_is_rejected() {
        let store = MemoryStore::new();
        store.create_quiz(&sample_quiz("quiz-1")).await.unwrap();
        assert!(store.create_quiz(&sample_quiz("quiz-1")).await.is_err());
    }

    #[tokio::test]
    async fn upsert_replaces_existing_score() {
        let store = MemoryStore::new();
        store.upsert_quiz_score("u1", "quiz-1", 1).await.unwrap();
        store.upsert_quiz_score("u1", "quiz-1", 3).await.unwrap();
        store.upsert_quiz_score("u1", "quiz-2", 5).await.unwrap();

        let stats = store.get_stats("u1").await.unwrap().unwrap();
        assert_eq!(stats.quiz_scores.len(), 2);
        assert_eq!(stats.score_for("quiz-1"), Some(3));
        assert_eq!(stats.score_for("quiz-2"), Some(5));
    }

    #[tokio::test]
    async fn attempts_listed_newest_first() {
        let store = MemoryStore::new();
        store.create_quiz(&sample_quiz("quiz-1")).await.unwrap();
        store.create_quiz(&sample_quiz("quiz-2")).await.unwrap();
        for (id, quiz) in [("a1", "quiz-1"), ("a2", "quiz-2"), ("a3", "quiz-1")] {
            store
                .create(&Attempt {
                    id: id.to_string(),
                    quiz_id: quiz.to_string(),
                    user_id: "u1".to_string(),
                    answers: vec![],
                    score: 0,
                    created_at: Utc::now(),
                })
                .await
                .unwrap();
        }

        let all: Vec<String> = store
            .list_for_user("u1", None)
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(all, vec!["a3", "a2", "a1"]);

        let one = store.list_for_user("u1", Some("quiz-1")).await.unwrap();
        assert_eq!(one.len(), 2);
        assert_eq!(store.count_for_quiz("quiz-1").await.unwrap(), 2);
        assert!(store.list_for_user("u2", None).await.unwrap().is_empty());
    }
}
