// src/models/result.rs

use serde::Serialize;
use sqlx::FromRow;

/// Represents the 'student_results' table. One row per submission,
/// append-only; a resubmission adds a new row.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentResult {
    pub id: i64,
    pub exam_id: i64,
    pub student_id: i64,
    /// Score in [0, 10].
    pub score: f64,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Aggregate statistics over all results of one exam.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamStatisticsResponse {
    pub exam_id: i64,
    pub total_students: i64,
    pub average_score: f64,
    pub max_score: f64,
    pub min_score: f64,
    pub score_distribution: ScoreDistribution,
}

/// Fixed five-band histogram over scores in [0, 10].
///
/// Bands are right-open except the last, which is closed at 10.
/// Using named fields instead of a map keeps the JSON key order
/// structural: "0-2", "2-4", "4-6", "6-8", "8-10".
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct ScoreDistribution {
    #[serde(rename = "0-2")]
    pub band_0_2: i64,
    #[serde(rename = "2-4")]
    pub band_2_4: i64,
    #[serde(rename = "4-6")]
    pub band_4_6: i64,
    #[serde(rename = "6-8")]
    pub band_6_8: i64,
    #[serde(rename = "8-10")]
    pub band_8_10: i64,
}

impl ScoreDistribution {
    /// Buckets one score into its band.
    pub fn add(&mut self, score: f64) {
        if score < 2.0 {
            self.band_0_2 += 1;
        } else if score < 4.0 {
            self.band_2_4 += 1;
        } else if score < 6.0 {
            self.band_4_6 += 1;
        } else if score < 8.0 {
            self.band_6_8 += 1;
        } else {
            self.band_8_10 += 1;
        }
    }

    pub fn total(&self) -> i64 {
        self.band_0_2 + self.band_2_4 + self.band_4_6 + self.band_6_8 + self.band_8_10
    }
}
