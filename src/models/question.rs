// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use validator::Validate;

/// Question difficulty band. Stored as TEXT in the 'questions' table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum QuestionLevel {
    Easy,
    Medium,
    Hard,
}

impl QuestionLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionLevel::Easy => "EASY",
            QuestionLevel::Medium => "MEDIUM",
            QuestionLevel::Hard => "HARD",
        }
    }
}

/// Represents the 'questions' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: i64,

    /// The text content of the question (sanitized HTML).
    pub content: String,

    pub level: QuestionLevel,

    pub topic_id: i64,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Represents the 'answers' table. A question owns 2-N answers,
/// coded A/B/C/D in practice, exactly one flagged correct.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub id: i64,
    pub question_id: i64,
    pub code: String,
    pub content: String,
    pub is_correct: bool,
}

/// A question together with its owned answer set, as returned by the bank API.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionWithAnswers {
    pub id: i64,
    pub content: String,
    pub level: QuestionLevel,
    pub topic_id: i64,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub answers: Vec<Answer>,
}

impl QuestionWithAnswers {
    pub fn new(question: Question, answers: Vec<Answer>) -> Self {
        Self {
            id: question.id,
            content: question.content,
            level: question.level,
            topic_id: question.topic_id,
            created_at: question.created_at,
            answers,
        }
    }
}

/// One answer in a create/update question payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerPayload {
    pub code: String,
    pub content: String,
    pub is_correct: bool,
}

/// DTO for creating or replacing a question and its answer set.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRequest {
    pub topic_id: i64,
    #[validate(length(min = 1, max = 4000))]
    pub content: String,
    pub level: QuestionLevel,
    pub answers: Vec<AnswerPayload>,
}
