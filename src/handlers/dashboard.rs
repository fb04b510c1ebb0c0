// src/handlers/dashboard.rs

use axum::{Json, extract::State, response::IntoResponse};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::{error::AppError, utils::html::strip_tags};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub total_questions: i64,
    pub total_exams: i64,
    pub total_results: i64,
    pub activities: Vec<RecentActivity>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentActivity {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub title: &'static str,
    pub description: String,
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut)
}

/// Aggregates totals plus a merged feed of the latest exams, questions and
/// results (6 most recent entries by id).
pub async fn get_dashboard_stats(
    State(pool): State<SqlitePool>,
) -> Result<impl IntoResponse, AppError> {
    let total_questions = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM questions")
        .fetch_one(&pool)
        .await?;
    let total_exams = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM exams")
        .fetch_one(&pool)
        .await?;
    let total_results = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM student_results")
        .fetch_one(&pool)
        .await?;

    let mut activities: Vec<RecentActivity> = Vec::new();

    let recent_exams = sqlx::query_as::<_, (i64, String, String)>(
        "SELECT id, exam_name, exam_code FROM exams ORDER BY id DESC LIMIT 5",
    )
    .fetch_all(&pool)
    .await?;
    for (id, exam_name, exam_code) in recent_exams {
        activities.push(RecentActivity {
            id,
            kind: "EXAM",
            title: "New exam composed",
            description: format!("{} ({})", exam_name, exam_code),
        });
    }

    let recent_questions = sqlx::query_as::<_, (i64, String)>(
        "SELECT id, content FROM questions ORDER BY id DESC LIMIT 5",
    )
    .fetch_all(&pool)
    .await?;
    for (id, content) in recent_questions {
        activities.push(RecentActivity {
            id,
            kind: "QUESTION",
            title: "New question added",
            description: truncate(&strip_tags(&content), 50),
        });
    }

    let recent_results = sqlx::query_as::<_, (i64, i64, f64)>(
        "SELECT id, student_id, score FROM student_results ORDER BY id DESC LIMIT 5",
    )
    .fetch_all(&pool)
    .await?;
    for (id, student_id, score) in recent_results {
        activities.push(RecentActivity {
            id,
            kind: "RESULT",
            title: "Submission graded",
            description: format!("Student {} scored {:.2}", student_id, score),
        });
    }

    activities.sort_by(|a, b| b.id.cmp(&a.id));
    activities.truncate(6);

    Ok(Json(DashboardResponse {
        total_questions,
        total_exams,
        total_results,
        activities,
    }))
}
