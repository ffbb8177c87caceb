// src/routes.rs

use axum::{
    Router,
    http::Method,
    middleware,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{attempt, docs, quiz, stats},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (quizzes, users, docs).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (repositories, engine, config).
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin([
            "http://localhost:3000".parse().expect("static origin"),
            "http://127.0.0.1:3000".parse().expect("static origin"),
        ])
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let auth = middleware::from_fn_with_state(state.clone(), auth_middleware);

    let quiz_routes = Router::new()
        .route("/", get(quiz::list_quizzes))
        .route("/{quiz_id}", get(quiz::get_quiz))
        // Protected quiz routes
        .merge(
            Router::new()
                .route("/", post(quiz::create_quiz))
                .route("/attempts/me", get(attempt::list_my_attempts))
                .route("/{quiz_id}/answers", get(quiz::get_quiz_answers))
                .route("/{quiz_id}/audit", get(quiz::audit_quiz))
                .route("/{quiz_id}/reconcile", post(quiz::reconcile_quiz))
                .route("/{quiz_id}/attempt", post(attempt::submit_attempt))
                .route("/{quiz_id}/attempts", get(attempt::list_my_quiz_attempts))
                .layer(auth.clone()),
        );

    let user_routes = Router::new()
        .route("/{user_id}/stats", get(stats::get_user_stats))
        .merge(
            Router::new()
                .route("/me/stats", get(stats::get_my_stats))
                .layer(auth),
        );

    Router::new()
        .nest("/api/quizzes", quiz_routes)
        .nest("/api/users", user_routes)
        .route("/api-docs/openapi.json", get(docs::openapi_json))
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
