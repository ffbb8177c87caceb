// src/services/scoring.rs

use std::collections::HashMap;

use crate::{
    error::AttemptError,
    models::{
        attempt::{AnswerEntry, GivenAnswer},
        quiz::Quiz,
    },
};

/// Rejects entries that do not name a question by index or by id.
pub fn validate_answers(answers: &[AnswerEntry]) -> Result<(), AttemptError> {
    for (pos, entry) in answers.iter().enumerate() {
        if entry.question_index.is_none() && entry.question_id.is_none() {
            return Err(AttemptError::Validation(format!(
                "answers[{}]: questionIndex or questionId is required",
                pos
            )));
        }
        if entry.question_id.as_deref().is_some_and(|id| id.trim().is_empty()) {
            return Err(AttemptError::Validation(format!(
                "answers[{}]: questionId must not be empty",
                pos
            )));
        }
    }
    Ok(())
}

/// Counts the questions answered correctly.
///
/// Iterates the quiz's own question order. An entry matches a question by index first,
/// then by question id; when several entries target the same question the first one is
/// used. Entries that match no question are ignored, unanswered questions score zero.
pub fn score_answers(quiz: &Quiz, answers: &[AnswerEntry]) -> u32 {
    let mut by_index: HashMap<u32, &GivenAnswer> = HashMap::with_capacity(answers.len());
    let mut by_id: HashMap<&str, &GivenAnswer> = HashMap::new();

    for entry in answers {
        if let Some(idx) = entry.question_index {
            by_index.entry(idx).or_insert(&entry.given);
        } else if let Some(id) = entry.question_id.as_deref() {
            by_id.entry(id).or_insert(&entry.given);
        }
    }

    quiz.questions
        .iter()
        .enumerate()
        .filter(|(idx, question)| {
            by_index
                .get(&(*idx as u32))
                .or_else(|| by_id.get(question.id.as_str()))
                .is_some_and(|given| question.answer.is_satisfied_by(given))
        })
        .count() as u32
}
