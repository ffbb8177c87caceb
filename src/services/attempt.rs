// src/services/attempt.rs

use std::sync::Arc;

use chrono::Utc;

use crate::{
    error::{AttemptError, StorageStep},
    models::attempt::{AnswerEntry, Attempt, AttemptResult},
    repository::{AttemptStore, QuizRepository, StoreError, UserStatsRepository},
    services::scoring::{score_answers, validate_answers},
};

/// Scores submissions and applies the resulting writes.
///
/// Writes happen in a fixed order: attempt record, quiz counter, user stats. A failure stops
/// the sequence without undoing earlier steps; the attempt record is the source of truth
/// for reconciliation.
pub struct AttemptEngine {
    quizzes: Arc<dyn QuizRepository>,
    users: Arc<dyn UserStatsRepository>,
    attempts: Arc<dyn AttemptStore>,
}

impl AttemptEngine {
    pub fn new(
        quizzes: Arc<dyn QuizRepository>,
        users: Arc<dyn UserStatsRepository>,
        attempts: Arc<dyn AttemptStore>,
    ) -> Self {
        Self {
            quizzes,
            users,
            attempts,
        }
    }

    /// Submits `answers` for `quiz_id` on behalf of `user_id`.
    ///
    /// * Fails with `Validation` or `NotFound` before anything is written.
    /// * Each resubmission creates a new attempt record.
    pub async fn submit_attempt(
        &self,
        quiz_id: &str,
        user_id: &str,
        answers: Vec<AnswerEntry>,
    ) -> Result<AttemptResult, AttemptError> {
        validate_answers(&answers)?;

        let quiz = self
            .quizzes
            .get_quiz(quiz_id)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load quiz {}: {}", quiz_id, e);
                AttemptError::storage(StorageStep::QuizLoad, e)
            })?
            .ok_or_else(|| AttemptError::NotFound("Quiz not found".to_string()))?;

        let score = score_answers(&quiz, &answers);
        let total = quiz.max_score();

        let attempt = Attempt {
            id: uuid::Uuid::new_v4().to_string(),
            quiz_id: quiz.id.clone(),
            user_id: user_id.to_string(),
            answers,
            score: i64::from(score),
            created_at: Utc::now(),
        };

        self.attempts
            .create(&attempt)
            .await
            .map_err(|e| step_failed(StorageStep::AttemptWrite, &attempt, e))?;

        self.quizzes
            .increment_attempt_count(&quiz.id)
            .await
            .map_err(|e| step_failed(StorageStep::QuizCounter, &attempt, e))?;

        self.users
            .increment_stats(user_id, attempt.score)
            .await
            .map_err(|e| step_failed(StorageStep::UserStats, &attempt, e))?;

        self.users
            .upsert_quiz_score(user_id, &quiz.id, attempt.score)
            .await
            .map_err(|e| step_failed(StorageStep::UserStats, &attempt, e))?;

        tracing::info!(
            "Attempt {} recorded: quiz={} user={} score={}/{}",
            attempt.id,
            quiz.id,
            user_id,
            score,
            total
        );

        Ok(AttemptResult { score, total })
    }
}

fn step_failed(step: StorageStep, attempt: &Attempt, err: StoreError) -> AttemptError {
    tracing::error!(
        "Attempt {} (quiz={} user={}) failed at {}: {}",
        attempt.id,
        attempt.quiz_id,
        attempt.user_id,
        step,
        err
    );
    AttemptError::storage(step, err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{
            attempt::GivenAnswer,
            quiz::{AnswerKey, Question, Quiz},
            user_stats::UserStats,
        },
        repository::{StoreResult, memory::MemoryStore},
    };
    use async_trait::async_trait;

    const KEYS: [&str; 5] = ["B", "A", "D", "C", "A"];

    fn quiz(id: &str) -> Quiz {
        Quiz {
            id: id.to_string(),
            owner_id: "owner".to_string(),
            title: "Five questions".to_string(),
            subject: Some("Science".to_string()),
            grade: None,
            questions: KEYS
                .iter()
                .enumerate()
                .map(|(i, key)| Question {
                    id: format!("{}-q{}", id, i),
                    prompt: format!("Question {}", i),
                    options: ["A", "B", "C", "D", "E"].iter().map(|o| o.to_string()).collect(),
                    answer: AnswerKey::Value(key.to_string()),
                    image: None,
                })
                .collect(),
            attempts_count: 0,
            created_at: Utc::now(),
        }
    }

    /// First `n` answers correct, the rest wrong.
    fn answers_scoring(n: usize) -> Vec<AnswerEntry> {
        KEYS.iter()
            .enumerate()
            .map(|(i, key)| {
                let given = if i < n { key.to_string() } else { "X".to_string() };
                AnswerEntry::by_index(i as u32, GivenAnswer::Text(given))
            })
            .collect()
    }

    async fn setup() -> (Arc<MemoryStore>, AttemptEngine) {
        let store = Arc::new(MemoryStore::new());
        store.create_quiz(&quiz("quiz-1")).await.unwrap();
        let engine = AttemptEngine::new(store.clone(), store.clone(), store.clone());
        (store, engine)
    }

    async fn stats(store: &MemoryStore, user_id: &str) -> UserStats {
        store.get_stats(user_id).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn partial_submission_scores_and_updates_counters() {
        let (store, engine) = setup().await;
        let answers = vec![
            AnswerEntry::by_index(0, GivenAnswer::Text("B".to_string())),
            AnswerEntry::by_index(1, GivenAnswer::Text("A".to_string())),
            AnswerEntry::by_index(2, GivenAnswer::Text("X".to_string())),
            AnswerEntry::by_index(4, GivenAnswer::Text("A".to_string())),
        ];

        let result = engine.submit_attempt("quiz-1", "alice", answers.clone()).await.unwrap();
        assert_eq!(result, AttemptResult { score: 3, total: 5 });

        let quiz = store.get_quiz("quiz-1").await.unwrap().unwrap();
        assert_eq!(quiz.attempts_count, 1);

        let alice = stats(&store, "alice").await;
        assert_eq!(alice.total_score, 3);
        assert_eq!(alice.attempts_count, 1);
        assert_eq!(alice.score_for("quiz-1"), Some(3));

        let recorded = store.list_for_user("alice", Some("quiz-1")).await.unwrap();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].answers, answers);
        assert_eq!(recorded[0].score, 3);
    }

    #[tokio::test]
    async fn unknown_quiz_writes_nothing() {
        let (store, engine) = setup().await;

        let err = engine
            .submit_attempt("doesnotexist", "alice", answers_scoring(5))
            .await
            .unwrap_err();
        assert!(matches!(err, AttemptError::NotFound(ref msg) if msg == "Quiz not found"));

        assert!(store.list_for_user("alice", None).await.unwrap().is_empty());
        assert!(store.get_stats("alice").await.unwrap().is_none());
        assert_eq!(store.get_quiz("quiz-1").await.unwrap().unwrap().attempts_count, 0);
    }

    #[tokio::test]
    async fn malformed_answers_write_nothing() {
        let (store, engine) = setup().await;
        let answers = vec![AnswerEntry {
            question_index: None,
            question_id: None,
            given: GivenAnswer::Text("B".to_string()),
        }];

        let err = engine.submit_attempt("quiz-1", "alice", answers).await.unwrap_err();
        assert!(matches!(err, AttemptError::Validation(_)));
        assert_eq!(store.count_for_quiz("quiz-1").await.unwrap(), 0);
        assert!(store.get_stats("alice").await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_users_on_same_quiz() {
        let (store, engine) = setup().await;
        let engine = Arc::new(engine);

        let a = {
            let engine = engine.clone();
            tokio::spawn(async move { engine.submit_attempt("quiz-1", "alice", answers_scoring(2)).await })
        };
        let b = {
            let engine = engine.clone();
            tokio::spawn(async move { engine.submit_attempt("quiz-1", "bob", answers_scoring(4)).await })
        };
        assert_eq!(a.await.unwrap().unwrap().score, 2);
        assert_eq!(b.await.unwrap().unwrap().score, 4);

        assert_eq!(store.get_quiz("quiz-1").await.unwrap().unwrap().attempts_count, 2);
        assert_eq!(stats(&store, "alice").await.total_score, 2);
        assert_eq!(stats(&store, "bob").await.total_score, 4);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn attempt_counter_increases_by_exactly_n() {
        let (store, engine) = setup().await;
        let engine = Arc::new(engine);
        let n = 50;

        let handles: Vec<_> = (0..n)
            .map(|i| {
                let engine = engine.clone();
                tokio::spawn(async move {
                    let user = format!("user-{}", i % 7);
                    engine.submit_attempt("quiz-1", &user, answers_scoring(i % 6)).await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.get_quiz("quiz-1").await.unwrap().unwrap().attempts_count, n as i64);
        assert_eq!(store.count_for_quiz("quiz-1").await.unwrap(), n as i64);

        let mut attempts_by_users = 0;
        for u in 0..7 {
            attempts_by_users += stats(&store, &format!("user-{}", u)).await.attempts_count;
        }
        assert_eq!(attempts_by_users, n as i64);
    }

    #[tokio::test]
    async fn repeat_attempt_keeps_latest_quiz_score() {
        let (store, engine) = setup().await;

        engine.submit_attempt("quiz-1", "alice", answers_scoring(1)).await.unwrap();
        engine.submit_attempt("quiz-1", "alice", answers_scoring(3)).await.unwrap();

        let alice = stats(&store, "alice").await;
        assert_eq!(alice.score_for("quiz-1"), Some(3));
        assert_eq!(alice.quiz_scores.len(), 1);
        assert_eq!(alice.total_score, 4);
        assert_eq!(alice.attempts_count, 2);
        assert_eq!(store.count_for_quiz("quiz-1").await.unwrap(), 2);
    }

    /// Stats store that rejects every write.
    struct BrokenStats;

    #[async_trait]
    impl UserStatsRepository for BrokenStats {
        async fn increment_stats(&self, _: &str, _: i64) -> StoreResult<()> {
            Err(StoreError::Database("connection reset".to_string()))
        }

        async fn upsert_quiz_score(&self, _: &str, _: &str, _: i64) -> StoreResult<()> {
            Err(StoreError::Database("connection reset".to_string()))
        }

        async fn get_stats(&self, _: &str) -> StoreResult<Option<UserStats>> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn stats_failure_keeps_attempt_and_names_step() {
        let store = Arc::new(MemoryStore::new());
        store.create_quiz(&quiz("quiz-1")).await.unwrap();
        let engine = AttemptEngine::new(store.clone(), Arc::new(BrokenStats), store.clone());

        let err = engine.submit_attempt("quiz-1", "alice", answers_scoring(2)).await.unwrap_err();
        match err {
            AttemptError::Storage { step, message } => {
                assert_eq!(step, StorageStep::UserStats);
                assert!(message.contains("connection reset"));
            }
            other => panic!("unexpected error: {:?}", other),
        }

        assert_eq!(store.count_for_quiz("quiz-1").await.unwrap(), 1);
        assert_eq!(store.get_quiz("quiz-1").await.unwrap().unwrap().attempts_count, 1);
    }

    struct BrokenAttempts;

    #[async_trait]
    impl AttemptStore for BrokenAttempts {
        async fn create(&self, _: &Attempt) -> StoreResult<()> {
            Err(StoreError::Database("disk full".to_string()))
        }

        async fn list_for_user(&self, _: &str, _: Option<&str>) -> StoreResult<Vec<Attempt>> {
            Ok(vec![])
        }

        async fn count_for_quiz(&self, _: &str) -> StoreResult<i64> {
            Ok(0)
        }
    }

    #[tokio::test]
    async fn attempt_write_failure_stops_before_counters() {
        let store = Arc::new(MemoryStore::new());
        store.create_quiz(&quiz("quiz-1")).await.unwrap();
        let engine = AttemptEngine::new(store.clone(), store.clone(), Arc::new(BrokenAttempts));

        let err = engine.submit_attempt("quiz-1", "alice", answers_scoring(3)).await.unwrap_err();
        assert!(matches!(
            err,
            AttemptError::Storage { step: StorageStep::AttemptWrite, .. }
        ));

        assert_eq!(store.get_quiz("quiz-1").await.unwrap().unwrap().attempts_count, 0);
        assert!(store.get_stats("alice").await.unwrap().is_none());
    }

    /// Reads from the wrapped store; counter updates fail.
    struct StuckCounter(Arc<MemoryStore>);

    #[async_trait]
    impl QuizRepository for StuckCounter {
        async fn create_quiz(&self, quiz: &Quiz) -> StoreResult<()> {
            self.0.create_quiz(quiz).await
        }

        async fn list_quizzes(&self) -> StoreResult<Vec<crate::models::quiz::QuizSummary>> {
            self.0.list_quizzes().await
        }

        async fn get_quiz(&self, quiz_id: &str) -> StoreResult<Option<Quiz>> {
            self.0.get_quiz(quiz_id).await
        }

        async fn increment_attempt_count(&self, _: &str) -> StoreResult<()> {
            Err(StoreError::Database("lock timeout".to_string()))
        }

        async fn set_attempt_count(&self, quiz_id: &str, count: i64) -> StoreResult<()> {
            self.0.set_attempt_count(quiz_id, count).await
        }
    }

    #[tokio::test]
    async fn counter_failure_keeps_attempt_and_skips_stats() {
        let store = Arc::new(MemoryStore::new());
        store.create_quiz(&quiz("quiz-1")).await.unwrap();
        let engine = AttemptEngine::new(
            Arc::new(StuckCounter(store.clone())),
            store.clone(),
            store.clone(),
        );

        let err = engine.submit_attempt("quiz-1", "alice", answers_scoring(2)).await.unwrap_err();
        match err {
            AttemptError::Storage { step, message } => {
                assert_eq!(step, StorageStep::QuizCounter);
                assert!(message.contains("lock timeout"));
            }
            other => panic!("unexpected error: {:?}", other),
        }

        assert_eq!(store.count_for_quiz("quiz-1").await.unwrap(), 1);
        assert_eq!(store.get_quiz("quiz-1").await.unwrap().unwrap().attempts_count, 0);
        assert!(store.get_stats("alice").await.unwrap().is_none());
    }
}
