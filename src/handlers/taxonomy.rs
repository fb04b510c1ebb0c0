// src/handlers/taxonomy.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::AppError,
    models::taxonomy::{CreateNameRequest, CreateTopicRequest, Grade, Subject, Topic},
};

/// Maps a SQLite foreign-key violation on delete to a 409 Conflict,
/// anything else to a 500.
fn delete_error(e: sqlx::Error, what: &str) -> AppError {
    if e.to_string().contains("FOREIGN KEY constraint failed") {
        AppError::Conflict(format!("{} is still referenced and cannot be deleted", what))
    } else {
        tracing::error!("Failed to delete {}: {:?}", what, e);
        AppError::InternalServerError(e.to_string())
    }
}

pub async fn list_subjects(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let subjects = sqlx::query_as::<_, Subject>("SELECT id, name FROM subjects ORDER BY id")
        .fetch_all(&pool)
        .await?;

    Ok(Json(subjects))
}

pub async fn create_subject(
    State(pool): State<SqlitePool>,
    Json(payload): Json<CreateNameRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let subject =
        sqlx::query_as::<_, Subject>("INSERT INTO subjects (name) VALUES ($1) RETURNING id, name")
            .bind(&payload.name)
            .fetch_one(&pool)
            .await?;

    Ok((StatusCode::CREATED, Json(subject)))
}

pub async fn delete_subject(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM subjects WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await
        .map_err(|e| delete_error(e, "Subject"))?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Subject not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_grades(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let grades = sqlx::query_as::<_, Grade>("SELECT id, name FROM grades ORDER BY id")
        .fetch_all(&pool)
        .await?;

    Ok(Json(grades))
}

pub async fn create_grade(
    State(pool): State<SqlitePool>,
    Json(payload): Json<CreateNameRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let grade =
        sqlx::query_as::<_, Grade>("INSERT INTO grades (name) VALUES ($1) RETURNING id, name")
            .bind(&payload.name)
            .fetch_one(&pool)
            .await?;

    Ok((StatusCode::CREATED, Json(grade)))
}

pub async fn delete_grade(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM grades WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await
        .map_err(|e| delete_error(e, "Grade"))?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Grade not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_topics(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let topics =
        sqlx::query_as::<_, Topic>("SELECT id, title, subject_id, grade_id FROM topics ORDER BY id")
            .fetch_all(&pool)
            .await?;

    Ok(Json(topics))
}

/// Creates a topic under an existing subject and grade.
pub async fn create_topic(
    State(pool): State<SqlitePool>,
    Json(payload): Json<CreateTopicRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    sqlx::query_scalar::<_, i64>("SELECT id FROM subjects WHERE id = $1")
        .bind(payload.subject_id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound("Subject not found".to_string()))?;

    sqlx::query_scalar::<_, i64>("SELECT id FROM grades WHERE id = $1")
        .bind(payload.grade_id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound("Grade not found".to_string()))?;

    let topic = sqlx::query_as::<_, Topic>(
        r#"
        INSERT INTO topics (title, subject_id, grade_id)
        VALUES ($1, $2, $3)
        RETURNING id, title, subject_id, grade_id
        "#,
    )
    .bind(&payload.title)
    .bind(payload.subject_id)
    .bind(payload.grade_id)
    .fetch_one(&pool)
    .await?;

    Ok((StatusCode::CREATED, Json(topic)))
}

pub async fn delete_topic(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM topics WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await
        .map_err(|e| delete_error(e, "Topic"))?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Topic not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
