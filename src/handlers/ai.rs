// src/handlers/ai.rs
//
// Proxies a prompt template to the text-generation provider for automated
// question drafting. The provider is treated as an opaque capability: we
// substitute placeholders, send the prompt, and extract the one JSON object
// the response is expected to contain.

use axum::{Json, extract::State, response::IntoResponse};
use serde::Deserialize;
use serde_json::{Value, json};
use sqlx::SqlitePool;

use crate::{config::Config, error::AppError, state::AppState};

const DEFAULT_PROMPT_NAME: &str = "question_generation_mcq";

/// Fallback when the named template is missing from storage.
const FALLBACK_TEMPLATE: &str =
    "Create a {level} multiple-choice question about {topic} for {subject} {grade}. \
     Respond with a single JSON object containing 'content' and an 'answers' array \
     of four options coded A-D, exactly one with \"isCorrect\": true.";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateQuestionRequest {
    pub topic: String,
    pub level: String,
    pub subject: String,
    pub grade: String,
    /// Optional template name; defaults to `question_generation_mcq`.
    pub prompt_name: Option<String>,
}

/// Extracts the substring between the first '{' and the last '}'.
/// Providers tend to wrap the JSON in prose or code fences.
fn extract_json_object(text: &str) -> &str {
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if end > start => &text[start..=end],
        _ => text.trim(),
    }
}

async fn call_provider(
    http: &reqwest::Client,
    config: &Config,
    prompt: &str,
) -> Result<String, AppError> {
    let api_key = config
        .ai_api_key
        .as_deref()
        .ok_or_else(|| AppError::Upstream("AI provider is not configured".to_string()))?;

    let url = format!(
        "{}/models/{}:generateContent",
        config.ai_base_url.trim_end_matches('/'),
        config.ai_model
    );

    let body = json!({
        "contents": [{ "parts": [{ "text": prompt }] }]
    });

    let response = http
        .post(&url)
        .header("x-goog-api-key", api_key)
        .json(&body)
        .send()
        .await?;

    let status = response.status();
    let payload: Value = response.json().await?;

    if !status.is_success() {
        return Err(AppError::Upstream(format!(
            "provider returned {}: {}",
            status, payload
        )));
    }

    payload
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| AppError::Upstream("provider response carried no text".to_string()))
}

/// Drafts a question via the AI provider.
///
/// Loads the named prompt template (or a built-in fallback), substitutes the
/// `{topic}`/`{level}`/`{subject}`/`{grade}` placeholders, calls the provider
/// and returns the extracted JSON object. Provider failures surface as 502;
/// no automatic retry.
pub async fn generate_question(
    State(state): State<AppState>,
    Json(payload): Json<GenerateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let name = payload
        .prompt_name
        .as_deref()
        .filter(|n| !n.is_empty())
        .unwrap_or(DEFAULT_PROMPT_NAME);

    let pool: &SqlitePool = &state.pool;
    let template =
        sqlx::query_scalar::<_, String>("SELECT content FROM prompt_templates WHERE name = $1")
            .bind(name)
            .fetch_optional(pool)
            .await?
            .unwrap_or_else(|| FALLBACK_TEMPLATE.to_string());

    let prompt = template
        .replace("{topic}", &payload.topic)
        .replace("{level}", &payload.level)
        .replace("{subject}", &payload.subject)
        .replace("{grade}", &payload.grade);

    let text = call_provider(&state.http, &state.config, &prompt).await?;

    let drafted: Value = serde_json::from_str(extract_json_object(&text)).map_err(|e| {
        AppError::Upstream(format!("provider returned unparseable text: {}", e))
    })?;

    Ok(Json(drafted))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_object_from_surrounding_prose() {
        let text = "Here you go:\n```json\n{\"content\": \"Q?\"}\n```\nEnjoy!";
        assert_eq!(extract_json_object(text), "{\"content\": \"Q?\"}");
    }

    #[test]
    fn spans_first_open_to_last_close() {
        let text = "{\"a\": {\"b\": 1}} trailing";
        assert_eq!(extract_json_object(text), "{\"a\": {\"b\": 1}}");
    }

    #[test]
    fn falls_back_to_trimmed_text_without_braces() {
        assert_eq!(extract_json_object("  no json here  "), "no json here");
    }
}
