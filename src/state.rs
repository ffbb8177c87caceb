// src/state.rs

use std::sync::Arc;

use axum::extract::FromRef;

use crate::{
    config::Config,
    repository::{AttemptStore, QuizRepository, UserStatsRepository, memory::MemoryStore, postgres::PgStore},
    services::AttemptEngine,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub quizzes: Arc<dyn QuizRepository>,
    pub user_stats: Arc<dyn UserStatsRepository>,
    pub attempts: Arc<dyn AttemptStore>,
    pub engine: Arc<AttemptEngine>,
}

impl AppState {
    /// Wires the repositories and the engine over a single store.
    pub fn from_store<S>(config: Config, store: Arc<S>) -> Self
    where
        S: QuizRepository + UserStatsRepository + AttemptStore + 'static,
    {
        let quizzes: Arc<dyn QuizRepository> = store.clone();
        let user_stats: Arc<dyn UserStatsRepository> = store.clone();
        let attempts: Arc<dyn AttemptStore> = store;
        let engine = Arc::new(AttemptEngine::new(
            quizzes.clone(),
            user_stats.clone(),
            attempts.clone(),
        ));

        Self {
            config,
            quizzes,
            user_stats,
            attempts,
            engine,
        }
    }

    pub fn with_postgres(config: Config, store: PgStore) -> Self {
        Self::from_store(config, Arc::new(store))
    }

    pub fn in_memory(config: Config) -> Self {
        Self::from_store(config, Arc::new(MemoryStore::new()))
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
