// src/models/taxonomy.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'subjects' lookup table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Subject {
    pub id: i64,
    pub name: String,
}

/// Represents the 'grades' lookup table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Grade {
    pub id: i64,
    pub name: String,
}

/// Represents the 'topics' table. A topic scopes a pool of questions
/// under a subject and a grade.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub id: i64,
    pub title: String,
    pub subject_id: i64,
    pub grade_id: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateNameRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTopicRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub subject_id: i64,
    pub grade_id: i64,
}
