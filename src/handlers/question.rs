// src/handlers/question.rs

use std::collections::{HashMap, HashSet};

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
    models::question::{Answer, AnswerPayload, Question, QuestionRequest, QuestionWithAnswers},
    utils::html::clean_html,
};

/// Write-time invariant check on a question's answer set:
/// at least two answers, distinct non-empty codes, exactly one correct.
fn validate_answer_set(answers: &[AnswerPayload]) -> Result<(), AppError> {
    if answers.len() < 2 {
        return Err(AppError::BadRequest(
            "A question needs at least two answers".to_string(),
        ));
    }

    let mut codes = HashSet::new();
    for answer in answers {
        let code = answer.code.trim();
        if code.is_empty() || code.len() > 5 {
            return Err(AppError::BadRequest(format!(
                "Invalid answer code '{}'",
                answer.code
            )));
        }
        if !codes.insert(code) {
            return Err(AppError::BadRequest(format!(
                "Duplicate answer code '{}'",
                code
            )));
        }
    }

    let correct_count = answers.iter().filter(|a| a.is_correct).count();
    if correct_count != 1 {
        return Err(AppError::BadRequest(format!(
            "Exactly one answer must be marked correct, got {}",
            correct_count
        )));
    }

    Ok(())
}

async fn topic_exists(pool: &SqlitePool, topic_id: i64) -> Result<(), AppError> {
    sqlx::query_scalar::<_, i64>("SELECT id FROM topics WHERE id = $1")
        .bind(topic_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound("Topic not found".to_string()))?;
    Ok(())
}

/// Lists all questions in the bank, each with its answer set.
pub async fn list_questions(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let questions = sqlx::query_as::<_, Question>(
        "SELECT id, content, level, topic_id, created_at FROM questions ORDER BY id DESC",
    )
    .fetch_all(&pool)
    .await?;

    let answers = sqlx::query_as::<_, Answer>(
        "SELECT id, question_id, code, content, is_correct FROM answers ORDER BY question_id, code",
    )
    .fetch_all(&pool)
    .await?;

    let mut grouped: HashMap<i64, Vec<Answer>> = HashMap::new();
    for answer in answers {
        grouped.entry(answer.question_id).or_default().push(answer);
    }

    let response: Vec<QuestionWithAnswers> = questions
        .into_iter()
        .map(|q| {
            let answers = grouped.remove(&q.id).unwrap_or_default();
            QuestionWithAnswers::new(q, answers)
        })
        .collect();

    Ok(Json(response))
}

/// Retrieves a single question with its answers.
pub async fn get_question(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let question = sqlx::query_as::<_, Question>(
        "SELECT id, content, level, topic_id, created_at FROM questions WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Question not found".to_string()))?;

    let answers = sqlx::query_as::<_, Answer>(
        "SELECT id, question_id, code, content, is_correct FROM answers WHERE question_id = $1 ORDER BY code",
    )
    .bind(id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(QuestionWithAnswers::new(question, answers)))
}

/// Creates a question together with its answer set, atomically.
pub async fn create_question(
    State(pool): State<SqlitePool>,
    Json(payload): Json<QuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }
    validate_answer_set(&payload.answers)?;
    topic_exists(&pool, payload.topic_id).await?;

    let content = clean_html(&payload.content);

    let mut tx = pool.begin().await?;

    let question_id = sqlx::query("INSERT INTO questions (content, level, topic_id) VALUES ($1, $2, $3)")
        .bind(&content)
        .bind(payload.level.as_str())
        .bind(payload.topic_id)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

    for answer in &payload.answers {
        sqlx::query(
            "INSERT INTO answers (question_id, code, content, is_correct) VALUES ($1, $2, $3, $4)",
        )
        .bind(question_id)
        .bind(answer.code.trim())
        .bind(clean_html(&answer.content))
        .bind(answer.is_correct)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    let question = sqlx::query_as::<_, Question>(
        "SELECT id, content, level, topic_id, created_at FROM questions WHERE id = $1",
    )
    .bind(question_id)
    .fetch_one(&pool)
    .await?;

    let answers = sqlx::query_as::<_, Answer>(
        "SELECT id, question_id, code, content, is_correct FROM answers WHERE question_id = $1 ORDER BY code",
    )
    .bind(question_id)
    .fetch_all(&pool)
    .await?;

    Ok((StatusCode::CREATED, Json(QuestionWithAnswers::new(question, answers))))
}

/// Updates a question and replaces its whole answer set.
pub async fn update_question(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
    Json(payload): Json<QuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }
    validate_answer_set(&payload.answers)?;
    topic_exists(&pool, payload.topic_id).await?;

    let content = clean_html(&payload.content);

    let mut tx = pool.begin().await?;

    let result = sqlx::query("UPDATE questions SET content = $1, level = $2, topic_id = $3 WHERE id = $4")
        .bind(&content)
        .bind(payload.level.as_str())
        .bind(payload.topic_id)
        .bind(id)
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Question not found".to_string()));
    }

    sqlx::query("DELETE FROM answers WHERE question_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    for answer in &payload.answers {
        sqlx::query(
            "INSERT INTO answers (question_id, code, content, is_correct) VALUES ($1, $2, $3, $4)",
        )
        .bind(id)
        .bind(answer.code.trim())
        .bind(clean_html(&answer.content))
        .bind(answer.is_correct)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    let question = sqlx::query_as::<_, Question>(
        "SELECT id, content, level, topic_id, created_at FROM questions WHERE id = $1",
    )
    .bind(id)
    .fetch_one(&pool)
    .await?;

    let answers = sqlx::query_as::<_, Answer>(
        "SELECT id, question_id, code, content, is_correct FROM answers WHERE question_id = $1 ORDER BY code",
    )
    .bind(id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(QuestionWithAnswers::new(question, answers)))
}

/// Deletes a question. Exam references and answers go with it.
pub async fn delete_question(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM exam_questions WHERE question_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    // answers cascade via the foreign key
    let result = sqlx::query("DELETE FROM questions WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete question: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Question not found".to_string()));
    }

    tx.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}
