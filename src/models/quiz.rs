// src/models/quiz.rs

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    config::{MAX_OPTIONS_PER_QUESTION, MIN_OPTIONS_PER_QUESTION},
    models::attempt::GivenAnswer,
    utils::html::clean_html,
};

/// How correct answers are keyed for a deployment.
/// A deployment stores one kind only; quizzes using the other kind are rejected at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AnswerKeyMode {
    Value,
    Index,
}

impl FromStr for AnswerKeyMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "value" => Ok(AnswerKeyMode::Value),
            "index" => Ok(AnswerKeyMode::Index),
            other => Err(format!("unknown answer key mode '{}'", other)),
        }
    }
}

/// The correct answer of a question.
///
/// JSON numbers deserialize as `Index`, strings as `Value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum AnswerKey {
    /// Position of the correct option in `options`.
    Index(u32),
    /// Literal text of the correct option.
    Value(String),
}

impl AnswerKey {
    pub fn mode(&self) -> AnswerKeyMode {
        match self {
            AnswerKey::Index(_) => AnswerKeyMode::Index,
            AnswerKey::Value(_) => AnswerKeyMode::Value,
        }
    }

    /// Exact match only. A text answer never satisfies an index key and vice versa.
    pub fn is_satisfied_by(&self, given: &GivenAnswer) -> bool {
        match (self, given) {
            (AnswerKey::Value(key), GivenAnswer::Text(text)) => key == text,
            (AnswerKey::Index(key), GivenAnswer::Index(idx)) => key == idx,
            _ => false,
        }
    }
}

/// A single question, stored as an element of the quiz's `questions` JSON array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Question {
    pub id: String,
    pub prompt: String,
    /// Fixed at creation, never mutated afterwards.
    pub options: Vec<String>,
    pub answer: AnswerKey,
    pub image: Option<String>,
}

/// Canonical quiz definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Quiz {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub subject: Option<String>,
    pub grade: Option<String>,
    pub questions: Vec<Question>,
    pub attempts_count: i64,
    pub created_at: DateTime<Utc>,
}

impl Quiz {
    /// Maximum score obtainable on this quiz: one point per question.
    pub fn max_score(&self) -> u32 {
        self.questions.len() as u32
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner_id == user_id
    }
}

/// DTO for sending a question to takers (excludes the answer key).
#[derive(Debug, Serialize, ToSchema)]
pub struct PublicQuestion {
    pub id: String,
    pub prompt: String,
    pub options: Vec<String>,
    pub image: Option<String>,
}

/// DTO for a quiz as seen by takers.
#[derive(Debug, Serialize, ToSchema)]
pub struct QuizView {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub subject: Option<String>,
    pub grade: Option<String>,
    pub questions: Vec<PublicQuestion>,
    pub questions_count: i64,
    pub attempts_count: i64,
    pub created_at: DateTime<Utc>,
}

impl From<Quiz> for QuizView {
    fn from(quiz: Quiz) -> Self {
        let questions_count = quiz.questions.len() as i64;
        Self {
            id: quiz.id,
            owner_id: quiz.owner_id,
            title: quiz.title,
            subject: quiz.subject,
            grade: quiz.grade,
            questions: quiz
                .questions
                .into_iter()
                .map(|q| PublicQuestion {
                    id: q.id,
                    prompt: q.prompt,
                    options: q.options,
                    image: q.image,
                })
                .collect(),
            questions_count,
            attempts_count: quiz.attempts_count,
            created_at: quiz.created_at,
        }
    }
}

/// Row shape for quiz listings.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct QuizSummary {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub subject: Option<String>,
    pub grade: Option<String>,
    pub questions_count: i64,
    pub attempts_count: i64,
    pub created_at: DateTime<Utc>,
}

impl From<&Quiz> for QuizSummary {
    fn from(quiz: &Quiz) -> Self {
        Self {
            id: quiz.id.clone(),
            owner_id: quiz.owner_id.clone(),
            title: quiz.title.clone(),
            subject: quiz.subject.clone(),
            grade: quiz.grade.clone(),
            questions_count: quiz.questions.len() as i64,
            attempts_count: quiz.attempts_count,
            created_at: quiz.created_at,
        }
    }
}

/// Stored attempt counter compared against the attempt records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct AttemptCountAudit {
    pub quiz_id: String,
    pub stored_attempts_count: i64,
    pub recorded_attempts: i64,
    /// `stored - recorded`; zero when consistent.
    pub drift: i64,
}

/// DTO for creating a question as part of a new quiz.
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateQuestionRequest {
    #[validate(length(min = 1, max = 1000))]
    pub prompt: String,
    #[validate(custom(function = validate_options))]
    pub options: Vec<String>,
    pub answer: AnswerKey,
    #[validate(length(max = 500))]
    pub image: Option<String>,
}

/// DTO for creating a new quiz.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateQuizRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 100))]
    pub subject: Option<String>,
    #[validate(length(max = 50))]
    pub grade: Option<String>,
    #[validate(length(min = 1, max = 100), nested)]
    pub questions: Vec<CreateQuestionRequest>,
}

fn validate_options(options: &[String]) -> Result<(), validator::ValidationError> {
    if options.len() < MIN_OPTIONS_PER_QUESTION || options.len() > MAX_OPTIONS_PER_QUESTION {
        return Err(validator::ValidationError::new("invalid_option_count"));
    }
    for opt in options {
        if opt.trim().is_empty() {
            return Err(validator::ValidationError::new("option_cannot_be_empty"));
        }
        if opt.len() > 500 {
            return Err(validator::ValidationError::new("option_too_long"));
        }
    }
    Ok(())
}

impl CreateQuizRequest {
    /// Checks every answer key against the deployment mode and its own options.
    pub fn check_answer_keys(&self, mode: AnswerKeyMode) -> Result<(), String> {
        for (idx, q) in self.questions.iter().enumerate() {
            if q.answer.mode() != mode {
                return Err(format!(
                    "questions[{}].answer: expected a {} key",
                    idx,
                    match mode {
                        AnswerKeyMode::Value => "text",
                        AnswerKeyMode::Index => "numeric index",
                    }
                ));
            }
            let consistent = match &q.answer {
                AnswerKey::Value(v) => q.options.iter().any(|opt| opt == v),
                AnswerKey::Index(i) => (*i as usize) < q.options.len(),
            };
            if !consistent {
                return Err(format!(
                    "questions[{}].answer must match one of the options",
                    idx
                ));
            }
        }
        Ok(())
    }

    /// Builds the stored quiz. Free text is sanitized; options and keys are kept verbatim
    /// so by-value keys keep matching their option.
    pub fn into_quiz(self, owner_id: &str) -> Quiz {
        Quiz {
            id: uuid::Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            title: clean_html(&self.title),
            subject: self.subject.as_deref().map(clean_html),
            grade: self.grade.as_deref().map(clean_html),
            questions: self
                .questions
                .into_iter()
                .map(|q| Question {
                    id: uuid::Uuid::new_v4().to_string(),
                    prompt: clean_html(&q.prompt),
                    options: q.options,
                    answer: q.answer,
                    image: q.image,
                })
                .collect(),
            attempts_count: 0,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(options: &[&str], answer: AnswerKey) -> CreateQuestionRequest {
        CreateQuestionRequest {
            prompt: "Which one?".to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
            answer,
            image: None,
        }
    }

    fn request(questions: Vec<CreateQuestionRequest>) -> CreateQuizRequest {
        CreateQuizRequest {
            title: "Fractions".to_string(),
            subject: Some("Math".to_string()),
            grade: None,
            questions,
        }
    }

    #[test]
    fn answer_key_deserializes_by_json_type() {
        let by_value: AnswerKey = serde_json::from_str("\"B\"").unwrap();
        let by_index: AnswerKey = serde_json::from_str("2").unwrap();
        assert_eq!(by_value, AnswerKey::Value("B".to_string()));
        assert_eq!(by_index, AnswerKey::Index(2));
    }

    #[test]
    fn answer_key_kinds_never_cross_match() {
        let key = AnswerKey::Index(1);
        assert!(key.is_satisfied_by(&GivenAnswer::Index(1)));
        assert!(!key.is_satisfied_by(&GivenAnswer::Text("1".to_string())));

        let key = AnswerKey::Value("B".to_string());
        assert!(key.is_satisfied_by(&GivenAnswer::Text("B".to_string())));
        assert!(!key.is_satisfied_by(&GivenAnswer::Text("b".to_string())));
    }

    #[test]
    fn create_request_accepts_well_formed_questions() {
        let req = request(vec![
            question(&["A", "B"], AnswerKey::Value("A".to_string())),
            question(&["A", "B", "C", "D", "E", "F"], AnswerKey::Value("F".to_string())),
        ]);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn create_request_rejects_bad_nested_question() {
        let mut bad = question(&["A", "B"], AnswerKey::Value("A".to_string()));
        bad.prompt = String::new();
        let req = request(vec![question(&["A", "B"], AnswerKey::Value("B".to_string())), bad]);
        assert!(req.validate().is_err());
    }

    #[test]
    fn create_request_rejects_bad_option_count() {
        let req = request(vec![question(&["only"], AnswerKey::Value("only".to_string()))]);
        assert!(req.validate().is_err());
    }

    #[test]
    fn create_request_rejects_empty_questions() {
        assert!(request(vec![]).validate().is_err());
    }

    #[test]
    fn check_answer_keys_enforces_mode() {
        let req = request(vec![question(&["A", "B"], AnswerKey::Index(1))]);
        assert!(req.validate().is_ok());
        assert!(req.check_answer_keys(AnswerKeyMode::Index).is_ok());
        assert!(req.check_answer_keys(AnswerKeyMode::Value).is_err());
    }

    #[test]
    fn check_answer_keys_requires_key_among_options() {
        let req = request(vec![question(&["A", "B"], AnswerKey::Value("C".to_string()))]);
        assert!(req.check_answer_keys(AnswerKeyMode::Value).is_err());

        let req = request(vec![question(&["A", "B"], AnswerKey::Index(2))]);
        assert!(req.check_answer_keys(AnswerKeyMode::Index).is_err());
    }

    #[test]
    fn into_quiz_assigns_ids_and_strips_markup() {
        let mut req = request(vec![
            question(&["A", "B"], AnswerKey::Value("A".to_string())),
            question(&["C", "D"], AnswerKey::Value("D".to_string())),
        ]);
        req.title = "Fractions<script>alert(1)</script>".to_string();

        let quiz = req.into_quiz("owner-1");
        assert_eq!(quiz.title, "Fractions");
        assert_eq!(quiz.owner_id, "owner-1");
        assert_eq!(quiz.attempts_count, 0);
        assert_eq!(quiz.max_score(), 2);
        assert_ne!(quiz.questions[0].id, quiz.questions[1].id);
    }
}
