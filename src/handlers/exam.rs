// src/handlers/exam.rs
//
// The exam composition and grading pipeline: sample questions per
// difficulty band, fix a per-exam answer-order permutation, render with or
// without the answer key, grade submissions, aggregate statistics.

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        exam::{
            AnswerDetail, AnswerRender, Exam, ExamDetailResponse, ExamQuestion,
            GenerateExamRequest, QuestionDetail, QuestionRender, RenderExamResponse,
            SubmitExamRequest,
        },
        question::{Answer, Question, QuestionLevel},
        result::{ExamStatisticsResponse, ScoreDistribution, StudentResult},
    },
    utils::random::{generate_exam_code, sample_without_replacement, shuffled_answer_order},
};

const EXAM_COLUMNS: &str = "id, topic_id, exam_code, exam_name, duration, created_at";

async fn fetch_exam_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Exam>, AppError> {
    let exam =
        sqlx::query_as::<_, Exam>(&format!("SELECT {EXAM_COLUMNS} FROM exams WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(exam)
}

async fn fetch_exam_questions(pool: &SqlitePool, exam_id: i64) -> Result<Vec<ExamQuestion>, AppError> {
    let rows = sqlx::query_as::<_, ExamQuestion>(
        "SELECT id, exam_id, question_id, answer_order FROM exam_questions WHERE exam_id = $1 ORDER BY id",
    )
    .bind(exam_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

async fn fetch_answers(pool: &SqlitePool, question_id: i64) -> Result<Vec<Answer>, AppError> {
    let answers = sqlx::query_as::<_, Answer>(
        "SELECT id, question_id, code, content, is_correct FROM answers WHERE question_id = $1 ORDER BY code",
    )
    .bind(question_id)
    .fetch_all(pool)
    .await?;
    Ok(answers)
}

/// Reorders a question's answers according to the stored answer-order string.
///
/// A code in the stored order with no matching answer means the exam data is
/// corrupt: fail the render rather than silently dropping the entry.
fn reorder_answers<'a>(
    answers: &'a [Answer],
    answer_order: &str,
    exam_question_id: i64,
) -> Result<Vec<&'a Answer>, AppError> {
    let by_code: HashMap<&str, &Answer> = answers.iter().map(|a| (a.code.as_str(), a)).collect();

    answer_order
        .split(',')
        .map(|code| {
            by_code.get(code).copied().ok_or_else(|| {
                AppError::DataCorruption(format!(
                    "exam question {} orders unknown answer code '{}'",
                    exam_question_id, code
                ))
            })
        })
        .collect()
}

/// Composes a new exam from the question bank.
///
/// * Samples the requested count per difficulty band, without replacement;
///   a band with fewer questions than requested contributes what it has.
/// * Shuffles the combined list to interleave difficulties.
/// * Fixes an independent random answer-code permutation per question.
/// * Writes the exam and its question rows in one transaction.
pub async fn generate_exam(
    State(pool): State<SqlitePool>,
    Json(payload): Json<GenerateExamRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    sqlx::query_scalar::<_, i64>("SELECT id FROM topics WHERE id = $1")
        .bind(payload.topic_id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound("Topic not found".to_string()))?;

    let mut rng = StdRng::seed_from_u64(rand::random());

    let bands = [
        (QuestionLevel::Easy, payload.easy),
        (QuestionLevel::Medium, payload.medium),
        (QuestionLevel::Hard, payload.hard),
    ];

    let mut selected: Vec<i64> = Vec::new();
    for (level, count) in bands {
        let pool_ids = sqlx::query_scalar::<_, i64>(
            "SELECT id FROM questions WHERE topic_id = $1 AND level = $2",
        )
        .bind(payload.topic_id)
        .bind(level.as_str())
        .fetch_all(&pool)
        .await?;

        selected.extend(sample_without_replacement(&pool_ids, count as usize, &mut rng));
    }

    // Interleave difficulties in the final paper order.
    selected.shuffle(&mut rng);

    let exam_code = generate_exam_code(&mut rng);

    let mut tx = pool.begin().await?;

    let exam_id = sqlx::query(
        "INSERT INTO exams (topic_id, exam_code, exam_name, duration) VALUES ($1, $2, $3, $4)",
    )
    .bind(payload.topic_id)
    .bind(&exam_code)
    .bind(&payload.exam_name)
    .bind(payload.duration)
    .execute(&mut *tx)
    .await?
    .last_insert_rowid();

    for question_id in &selected {
        let codes = sqlx::query_scalar::<_, String>(
            "SELECT code FROM answers WHERE question_id = $1 ORDER BY code",
        )
        .bind(question_id)
        .fetch_all(&mut *tx)
        .await?;

        let answer_order = shuffled_answer_order(&codes, &mut rng);

        sqlx::query(
            "INSERT INTO exam_questions (exam_id, question_id, answer_order) VALUES ($1, $2, $3)",
        )
        .bind(exam_id)
        .bind(question_id)
        .bind(&answer_order)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    tracing::info!(
        exam_id,
        exam_code = %exam_code,
        questions = selected.len(),
        "Composed new exam"
    );

    let exam = fetch_exam_by_id(&pool, exam_id)
        .await?
        .ok_or_else(|| AppError::InternalServerError("Exam vanished after insert".to_string()))?;

    Ok((StatusCode::CREATED, Json(exam)))
}

/// Lists all exams, newest first.
pub async fn list_exams(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let exams = sqlx::query_as::<_, Exam>(&format!(
        "SELECT {EXAM_COLUMNS} FROM exams ORDER BY id DESC"
    ))
    .fetch_all(&pool)
    .await?;

    Ok(Json(exams))
}

/// Staff detail view: every question with answers in stored presentation
/// order, correctness flags included.
pub async fn get_exam_detail(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let exam = fetch_exam_by_id(&pool, id)
        .await?
        .ok_or(AppError::NotFound("Exam not found".to_string()))?;

    let topic_title = sqlx::query_scalar::<_, String>("SELECT title FROM topics WHERE id = $1")
        .bind(exam.topic_id)
        .fetch_optional(&pool)
        .await?
        .ok_or_else(|| {
            AppError::DataCorruption(format!("exam {} references missing topic {}", exam.id, exam.topic_id))
        })?;

    let exam_questions = fetch_exam_questions(&pool, exam.id).await?;

    let mut questions = Vec::with_capacity(exam_questions.len());
    for eq in &exam_questions {
        let question = sqlx::query_as::<_, Question>(
            "SELECT id, content, level, topic_id, created_at FROM questions WHERE id = $1",
        )
        .bind(eq.question_id)
        .fetch_optional(&pool)
        .await?
        .ok_or_else(|| {
            AppError::DataCorruption(format!(
                "exam question {} references missing question {}",
                eq.id, eq.question_id
            ))
        })?;

        let answers = fetch_answers(&pool, question.id).await?;
        let ordered = reorder_answers(&answers, &eq.answer_order, eq.id)?;

        questions.push(QuestionDetail {
            id: question.id,
            content: question.content,
            level: question.level,
            answers: ordered
                .into_iter()
                .map(|a| AnswerDetail {
                    id: a.id,
                    code: a.code.clone(),
                    content: a.content.clone(),
                    is_correct: a.is_correct,
                })
                .collect(),
        });
    }

    Ok(Json(ExamDetailResponse {
        id: exam.id,
        topic_id: exam.topic_id,
        topic_title,
        exam_code: exam.exam_code,
        exam_name: exam.exam_name,
        duration: exam.duration,
        total_questions: questions.len(),
        questions,
    }))
}

/// Student view, looked up by exam code. Same reordering as the staff view,
/// but the response type carries no correctness flag at all.
pub async fn render_exam_by_code(
    State(pool): State<SqlitePool>,
    Path(exam_code): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let exam = sqlx::query_as::<_, Exam>(&format!(
        "SELECT {EXAM_COLUMNS} FROM exams WHERE exam_code = $1"
    ))
    .bind(&exam_code)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Exam not found".to_string()))?;

    let exam_questions = fetch_exam_questions(&pool, exam.id).await?;

    let mut questions = Vec::with_capacity(exam_questions.len());
    for eq in &exam_questions {
        let question = sqlx::query_as::<_, Question>(
            "SELECT id, content, level, topic_id, created_at FROM questions WHERE id = $1",
        )
        .bind(eq.question_id)
        .fetch_optional(&pool)
        .await?
        .ok_or_else(|| {
            AppError::DataCorruption(format!(
                "exam question {} references missing question {}",
                eq.id, eq.question_id
            ))
        })?;

        let answers = fetch_answers(&pool, question.id).await?;
        let ordered = reorder_answers(&answers, &eq.answer_order, eq.id)?;

        questions.push(QuestionRender {
            id: question.id,
            content: question.content,
            answers: ordered
                .into_iter()
                .map(|a| AnswerRender {
                    id: a.id,
                    code: a.code.clone(),
                    content: a.content.clone(),
                })
                .collect(),
        });
    }

    Ok(Json(RenderExamResponse {
        exam_id: exam.id,
        exam_name: exam.exam_name,
        duration: exam.duration,
        questions,
    }))
}

/// Computes the score for `correct` hits out of `total` submitted answers,
/// scaled to [0, 10]. Zero submissions score zero rather than erroring.
fn compute_score(correct: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    correct as f64 / total as f64 * 10.0
}

/// Grades a submission against the answer key and persists the result.
///
/// Submitted question IDs are trusted to belong to the exam; each call
/// inserts a fresh result row (no upsert).
pub async fn submit_exam(
    State(pool): State<SqlitePool>,
    Json(payload): Json<SubmitExamRequest>,
) -> Result<impl IntoResponse, AppError> {
    fetch_exam_by_id(&pool, payload.exam_id)
        .await?
        .ok_or(AppError::NotFound("Exam not found".to_string()))?;

    let mut correct = 0usize;
    for submitted in &payload.answers {
        let answers = fetch_answers(&pool, submitted.question_id).await?;
        if let Some(right) = answers.iter().find(|a| a.is_correct) {
            if right.code == submitted.selected_code {
                correct += 1;
            }
        }
    }

    let score = compute_score(correct, payload.answers.len());

    let result_id = sqlx::query(
        "INSERT INTO student_results (exam_id, student_id, score) VALUES ($1, $2, $3)",
    )
    .bind(payload.exam_id)
    .bind(payload.student_id)
    .bind(score)
    .execute(&pool)
    .await?
    .last_insert_rowid();

    let result = sqlx::query_as::<_, StudentResult>(
        "SELECT id, exam_id, student_id, score, created_at FROM student_results WHERE id = $1",
    )
    .bind(result_id)
    .fetch_one(&pool)
    .await?;

    tracing::info!(
        exam_id = payload.exam_id,
        student_id = payload.student_id,
        score,
        "Graded exam submission"
    );

    Ok((StatusCode::CREATED, Json(result)))
}

/// Lists all results recorded for an exam.
pub async fn list_exam_results(
    State(pool): State<SqlitePool>,
    Path(exam_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let results = sqlx::query_as::<_, StudentResult>(
        "SELECT id, exam_id, student_id, score, created_at FROM student_results WHERE exam_id = $1 ORDER BY id",
    )
    .bind(exam_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(results))
}

/// Aggregate statistics over all results of an exam. An exam with no
/// results yields zeros and an empty distribution, not an error.
pub async fn get_exam_statistics(
    State(pool): State<SqlitePool>,
    Path(exam_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let results = sqlx::query_as::<_, StudentResult>(
        "SELECT id, exam_id, student_id, score, created_at FROM student_results WHERE exam_id = $1",
    )
    .bind(exam_id)
    .fetch_all(&pool)
    .await?;

    if results.is_empty() {
        return Ok(Json(ExamStatisticsResponse {
            exam_id,
            total_students: 0,
            average_score: 0.0,
            max_score: 0.0,
            min_score: 0.0,
            score_distribution: ScoreDistribution::default(),
        }));
    }

    let average_score = sqlx::query_scalar::<_, Option<f64>>(
        "SELECT AVG(score) FROM student_results WHERE exam_id = $1",
    )
    .bind(exam_id)
    .fetch_one(&pool)
    .await?
    .unwrap_or(0.0);

    let mut max_score = f64::MIN;
    let mut min_score = f64::MAX;
    let mut score_distribution = ScoreDistribution::default();
    for result in &results {
        max_score = max_score.max(result.score);
        min_score = min_score.min(result.score);
        score_distribution.add(result.score);
    }

    Ok(Json(ExamStatisticsResponse {
        exam_id,
        total_students: results.len() as i64,
        average_score,
        max_score,
        min_score,
        score_distribution,
    }))
}

/// Deletes an exam and its question rows in one transaction.
pub async fn delete_exam(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM exam_questions WHERE exam_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    let result = sqlx::query("DELETE FROM exams WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete exam: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Exam not found".to_string()));
    }

    tx.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}
