// src/models/user.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'users' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,

    /// Unique username.
    pub username: String,

    /// Unique email address.
    pub email: String,

    /// Argon2 password hash.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password: String,

    pub full_name: Option<String>,

    /// User role: 'TEACHER', 'ADMIN' or 'STUDENT'.
    pub role: String,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for creating a new user (Registration).
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(
        min = 3,
        max = 50,
        message = "Username length must be between 3 and 50 characters."
    ))]
    pub username: String,
    #[validate(email(message = "Invalid email address."))]
    pub email: String,
    #[validate(length(
        min = 4,
        max = 128,
        message = "Password length must be between 4 and 128 characters."
    ))]
    pub password: String,
    #[validate(length(max = 100))]
    pub full_name: Option<String>,
    /// Optional role string; anything unrecognized falls back to TEACHER.
    pub role: Option<String>,
}

/// DTO for user login.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 50))]
    pub username: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// Normalizes a client-supplied role string.
///
/// Accepts case-insensitive names with or without a 'ROLE_' prefix.
/// Unknown or missing values fall back to TEACHER (permissive policy).
pub fn normalize_role(input: Option<&str>) -> &'static str {
    let normalized = input
        .map(|r| r.trim().to_ascii_uppercase())
        .unwrap_or_default();
    let name = normalized.strip_prefix("ROLE_").unwrap_or(&normalized);

    match name {
        "ADMIN" => "ADMIN",
        "STUDENT" => "STUDENT",
        _ => "TEACHER",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_normalization_is_permissive() {
        assert_eq!(normalize_role(Some("admin")), "ADMIN");
        assert_eq!(normalize_role(Some("ROLE_ADMIN")), "ADMIN");
        assert_eq!(normalize_role(Some("Student")), "STUDENT");
        assert_eq!(normalize_role(Some("teacher")), "TEACHER");
        assert_eq!(normalize_role(Some("wizard")), "TEACHER");
        assert_eq!(normalize_role(None), "TEACHER");
    }
}
