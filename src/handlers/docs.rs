// src/handlers/docs.rs

use axum::{Json, response::IntoResponse};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::{
    handlers::{attempt, quiz, stats},
    models::{
        attempt::{
            AnswerEntry, AttemptHistoryEntry, AttemptResult, GivenAnswer, PerformanceBand,
            SubmitAttemptRequest,
        },
        quiz::{
            AnswerKey, AttemptCountAudit, CreateQuestionRequest, CreateQuizRequest,
            PublicQuestion, Question, Quiz, QuizSummary, QuizView,
        },
        user_stats::{QuizScore, UserStats},
    },
};

/// Registers the bearer JWT scheme referenced by protected paths.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        quiz::create_quiz,
        quiz::list_quizzes,
        quiz::get_quiz,
        quiz::get_quiz_answers,
        quiz::audit_quiz,
        quiz::reconcile_quiz,
        attempt::submit_attempt,
        attempt::list_my_attempts,
        attempt::list_my_quiz_attempts,
        stats::get_my_stats,
        stats::get_user_stats,
    ),
    components(schemas(
        AnswerKey,
        Question,
        Quiz,
        PublicQuestion,
        QuizView,
        QuizSummary,
        AttemptCountAudit,
        CreateQuestionRequest,
        CreateQuizRequest,
        GivenAnswer,
        AnswerEntry,
        SubmitAttemptRequest,
        AttemptResult,
        PerformanceBand,
        AttemptHistoryEntry,
        QuizScore,
        UserStats,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "quizzes", description = "Quiz definitions"),
        (name = "attempts", description = "Scoring and attempt history"),
        (name = "stats", description = "Per-user statistics")
    )
)]
pub struct ApiDoc;

/// Serves the OpenAPI document as JSON.
pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
