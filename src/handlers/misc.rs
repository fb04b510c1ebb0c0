// src/handlers/misc.rs

use axum::{Json, response::IntoResponse};
use serde_json::json;

/// Service banner with a short endpoint overview.
pub async fn home() -> impl IntoResponse {
    Json(json!({
        "message": "Welcome to the ExamForge API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "auth": "POST /api/auth/register, POST /api/auth/login",
            "questions": "GET/POST /api/questions, GET/PUT/DELETE /api/questions/{id}",
            "exams": "POST /api/exams/generate, GET /api/exams, GET /api/exams/{id}, GET /api/exams/code/{examCode}, POST /api/exams/submit",
            "prompts": "GET/POST /api/prompts, GET /api/prompts/{name}",
        }
    }))
}

/// Liveness probe.
pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "UP",
        "message": "ExamForge API is running"
    }))
}
