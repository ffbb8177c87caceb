// src/config.rs

use std::env;
use std::str::FromStr;

use dotenvy::dotenv;

use crate::models::quiz::AnswerKeyMode;

/// Accepted option count per question (inclusive).
pub const MIN_OPTIONS_PER_QUESTION: usize = 2;
pub const MAX_OPTIONS_PER_QUESTION: usize = 6;

/// Which store backs the repositories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "pg" => Ok(StorageBackend::Postgres),
            "memory" | "mem" => Ok(StorageBackend::Memory),
            other => Err(format!("unknown storage backend '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub rust_log: String,
    pub answer_key_mode: AnswerKeyMode,
    pub storage_backend: StorageBackend,
    pub bind_addr: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let storage_backend = env::var("STORAGE_BACKEND")
            .map(|v| v.parse().expect("STORAGE_BACKEND must be 'postgres' or 'memory'"))
            .unwrap_or(StorageBackend::Postgres);

        let database_url = env::var("DATABASE_URL").ok();
        if storage_backend == StorageBackend::Postgres && database_url.is_none() {
            panic!("DATABASE_URL must be set when STORAGE_BACKEND=postgres");
        }

        let jwt_secret = env::var("JWT_SECRET")
            .expect("JWT_SECRET must be set");

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let answer_key_mode = env::var("ANSWER_KEY_MODE")
            .map(|v| v.parse().expect("ANSWER_KEY_MODE must be 'value' or 'index'"))
            .unwrap_or(AnswerKeyMode::Value);

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        Self {
            database_url,
            jwt_secret,
            rust_log,
            answer_key_mode,
            storage_backend,
            bind_addr,
        }
    }
}
