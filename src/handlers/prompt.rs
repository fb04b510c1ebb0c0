// src/handlers/prompt.rs

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
    models::prompt::{PromptTemplate, PromptTemplateRequest},
};

const PROMPT_COLUMNS: &str = "id, name, content, description";

pub async fn list_prompts(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let prompts = sqlx::query_as::<_, PromptTemplate>(&format!(
        "SELECT {PROMPT_COLUMNS} FROM prompt_templates ORDER BY id"
    ))
    .fetch_all(&pool)
    .await?;

    Ok(Json(prompts))
}

/// Looks a template up by its unique name.
pub async fn get_prompt_by_name(
    State(pool): State<SqlitePool>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let prompt = sqlx::query_as::<_, PromptTemplate>(&format!(
        "SELECT {PROMPT_COLUMNS} FROM prompt_templates WHERE name = $1"
    ))
    .bind(&name)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Prompt template not found".to_string()))?;

    Ok(Json(prompt))
}

pub async fn create_prompt(
    State(pool): State<SqlitePool>,
    Json(payload): Json<PromptTemplateRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let prompt = sqlx::query_as::<_, PromptTemplate>(&format!(
        "INSERT INTO prompt_templates (name, content, description)
         VALUES ($1, $2, $3)
         RETURNING {PROMPT_COLUMNS}"
    ))
    .bind(&payload.name)
    .bind(&payload.content)
    .bind(&payload.description)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        if e.to_string().contains("UNIQUE constraint failed") {
            AppError::Conflict(format!("Prompt template '{}' already exists", payload.name))
        } else {
            tracing::error!("Failed to create prompt template: {:?}", e);
            AppError::InternalServerError(e.to_string())
        }
    })?;

    Ok((StatusCode::CREATED, Json(prompt)))
}

/// Replaces a template's name, content and description.
pub async fn update_prompt(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
    Json(payload): Json<PromptTemplateRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let result = sqlx::query(
        "UPDATE prompt_templates SET name = $1, content = $2, description = $3 WHERE id = $4",
    )
    .bind(&payload.name)
    .bind(&payload.content)
    .bind(&payload.description)
    .bind(id)
    .execute(&pool)
    .await
    .map_err(|e| {
        if e.to_string().contains("UNIQUE constraint failed") {
            AppError::Conflict(format!("Prompt template '{}' already exists", payload.name))
        } else {
            tracing::error!("Failed to update prompt template: {:?}", e);
            AppError::InternalServerError(e.to_string())
        }
    })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Prompt template not found".to_string()));
    }

    let prompt = sqlx::query_as::<_, PromptTemplate>(&format!(
        "SELECT {PROMPT_COLUMNS} FROM prompt_templates WHERE id = $1"
    ))
    .bind(id)
    .fetch_one(&pool)
    .await?;

    Ok(Json(prompt))
}

pub async fn delete_prompt(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM prompt_templates WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete prompt template: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Prompt template not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
