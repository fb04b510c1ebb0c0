// src/models/prompt.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'prompt_templates' table. Templates carry `{topic}`,
/// `{level}`, `{subject}` and `{grade}` placeholders that the AI proxy
/// substitutes before calling the provider.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PromptTemplate {
    pub id: i64,
    pub name: String,
    pub content: String,
    pub description: Option<String>,
}

/// DTO for creating or replacing a prompt template.
#[derive(Debug, Deserialize, Validate)]
pub struct PromptTemplateRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 10000))]
    pub content: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
}
