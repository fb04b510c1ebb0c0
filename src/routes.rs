// src/routes.rs

use axum::{
    Router, http::Method, middleware,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{ai, auth, dashboard, exam, misc, prompt, question, taxonomy},
    state::AppState,
    utils::jwt::{auth_middleware, staff_middleware},
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, questions, exams, prompts, ...).
/// * Student-facing exam routes (render by code, submit) stay public;
///   everything that manages the bank is behind JWT + staff checks.
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (pool, config, HTTP client).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:3000".parse().unwrap(),
        "http://127.0.0.1:3000".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    let exam_routes = Router::new()
        // Public student routes: fetch by code, submit answers
        .route("/code/{exam_code}", get(exam::render_exam_by_code))
        .route("/submit", post(exam::submit_exam))
        // Protected staff routes
        .merge(
            Router::new()
                .route("/generate", post(exam::generate_exam))
                .route("/", get(exam::list_exams))
                .route("/{id}", get(exam::get_exam_detail).delete(exam::delete_exam))
                .route("/{id}/results", get(exam::list_exam_results))
                .route("/{id}/statistics", get(exam::get_exam_statistics))
                .layer(middleware::from_fn(staff_middleware))
                .layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        );

    let question_routes = Router::new()
        .route("/", get(question::list_questions).post(question::create_question))
        .route(
            "/{id}",
            get(question::get_question)
                .put(question::update_question)
                .delete(question::delete_question),
        );

    let taxonomy_routes = Router::new()
        .route("/subjects", get(taxonomy::list_subjects).post(taxonomy::create_subject))
        .route("/subjects/{id}", axum::routing::delete(taxonomy::delete_subject))
        .route("/grades", get(taxonomy::list_grades).post(taxonomy::create_grade))
        .route("/grades/{id}", axum::routing::delete(taxonomy::delete_grade))
        .route("/topics", get(taxonomy::list_topics).post(taxonomy::create_topic))
        .route("/topics/{id}", axum::routing::delete(taxonomy::delete_topic));

    let prompt_routes = Router::new()
        .route("/", get(prompt::list_prompts).post(prompt::create_prompt))
        // GET looks templates up by name; PUT/DELETE address them by id.
        .route(
            "/{key}",
            get(prompt::get_prompt_by_name)
                .put(prompt::update_prompt)
                .delete(prompt::delete_prompt),
        );

    let ai_routes = Router::new().route("/generate-question", post(ai::generate_question));

    let dashboard_routes = Router::new().route("/stats", get(dashboard::get_dashboard_stats));

    // Staff-only management surface: bank, taxonomy, prompts, AI, dashboard.
    let staff_routes = Router::new()
        .nest("/questions", question_routes)
        .merge(taxonomy_routes)
        .nest("/prompts", prompt_routes)
        .nest("/ai", ai_routes)
        .nest("/dashboard", dashboard_routes)
        .layer(middleware::from_fn(staff_middleware))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/", get(misc::home))
        .route("/health", get(misc::health))
        .nest("/api/auth", auth_routes)
        .nest("/api/exams", exam_routes)
        .nest("/api", staff_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
