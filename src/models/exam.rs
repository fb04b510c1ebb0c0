// src/models/exam.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::question::QuestionLevel;

/// Represents the 'exams' table. Created once by the composer,
/// immutable afterwards except for deletion.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exam {
    pub id: i64,
    pub topic_id: i64,
    /// Short, unique, human-shareable code students use to open the exam.
    pub exam_code: String,
    pub exam_name: String,
    /// Duration in minutes.
    pub duration: i64,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Join row between an exam and a selected question.
///
/// `answer_order` is the per-exam presentation permutation of the question's
/// answer codes, comma-joined (e.g. "B,A,D,C"). Codes themselves are stable;
/// only the display order varies per exam.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamQuestion {
    pub id: i64,
    pub exam_id: i64,
    pub question_id: i64,
    pub answer_order: String,
}

/// DTO for composing a new exam from the question bank.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GenerateExamRequest {
    pub topic_id: i64,
    #[validate(range(min = 0, max = 100))]
    pub easy: i64,
    #[validate(range(min = 0, max = 100))]
    pub medium: i64,
    #[validate(range(min = 0, max = 100))]
    pub hard: i64,
    #[validate(length(min = 1, max = 200))]
    pub exam_name: String,
    #[validate(range(min = 1, max = 600))]
    pub duration: i64,
}

/// Staff-facing exam view: full metadata plus every question with its
/// answers in stored presentation order, correctness flags included.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamDetailResponse {
    pub id: i64,
    pub topic_id: i64,
    pub topic_title: String,
    pub exam_code: String,
    pub exam_name: String,
    pub duration: i64,
    pub total_questions: usize,
    pub questions: Vec<QuestionDetail>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDetail {
    pub id: i64,
    pub content: String,
    pub level: QuestionLevel,
    pub answers: Vec<AnswerDetail>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerDetail {
    pub id: i64,
    pub code: String,
    pub content: String,
    pub is_correct: bool,
}

/// Student-facing exam view. Deliberately has no correctness field anywhere
/// in the structure, so it cannot leak through serialization.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderExamResponse {
    pub exam_id: i64,
    pub exam_name: String,
    pub duration: i64,
    pub questions: Vec<QuestionRender>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRender {
    pub id: i64,
    pub content: String,
    pub answers: Vec<AnswerRender>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRender {
    pub id: i64,
    pub code: String,
    pub content: String,
}

/// DTO for submitting a completed exam.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitExamRequest {
    pub exam_id: i64,
    pub student_id: i64,
    pub answers: Vec<AnswerSubmit>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerSubmit {
    pub question_id: i64,
    /// The original answer code the student picked (A/B/C/D).
    pub selected_code: String,
}
