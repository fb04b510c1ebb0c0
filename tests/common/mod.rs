// tests/common/mod.rs

use examforge::{config::Config, routes, state::AppState};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

/// Spawns the app on a random port against a fresh in-memory SQLite database.
/// Returns the base URL and the pool for direct seeding/inspection.
pub async fn spawn_app() -> (String, SqlitePool) {
    // One connection keeps the in-memory database alive and shared
    // between the server and the test body.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory SQLite");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    let config = Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600, // 10 minutes for tests
        rust_log: "error".to_string(),
        admin_username: None,
        admin_password: None,
        ai_api_key: None,
        ai_base_url: "http://127.0.0.1:9".to_string(),
        ai_model: "test-model".to_string(),
    };

    let state = AppState {
        pool: pool.clone(),
        config,
        http: reqwest::Client::new(),
    };

    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (address, pool)
}

/// Registers a fresh user (default TEACHER role) and returns a bearer token.
pub async fn staff_token(client: &reqwest::Client, address: &str) -> String {
    let username = format!("t_{}", &uuid::Uuid::new_v4().to_string()[..8]);
    let password = "password123";

    let response = client
        .post(format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "password": password
        }))
        .send()
        .await
        .expect("Register failed");
    assert_eq!(response.status().as_u16(), 201);

    let login: serde_json::Value = client
        .post(format!("{}/api/auth/login", address))
        .json(&serde_json::json!({
            "username": username,
            "password": password
        }))
        .send()
        .await
        .expect("Login failed")
        .json()
        .await
        .expect("Failed to parse login json");

    login["token"].as_str().expect("Token not found").to_string()
}

/// Seeds a subject, a grade and a topic; returns the topic id.
pub async fn seed_topic(pool: &SqlitePool) -> i64 {
    let subject_id = sqlx::query("INSERT INTO subjects (name) VALUES ('Chemistry')")
        .execute(pool)
        .await
        .unwrap()
        .last_insert_rowid();
    let grade_id = sqlx::query("INSERT INTO grades (name) VALUES ('Grade 12')")
        .execute(pool)
        .await
        .unwrap()
        .last_insert_rowid();

    sqlx::query("INSERT INTO topics (title, subject_id, grade_id) VALUES ('Hydrocarbons', $1, $2)")
        .bind(subject_id)
        .bind(grade_id)
        .execute(pool)
        .await
        .unwrap()
        .last_insert_rowid()
}

/// Seeds one question with four answers A-D, `correct` flagged as the key.
pub async fn seed_question(pool: &SqlitePool, topic_id: i64, level: &str, correct: &str) -> i64 {
    let question_id =
        sqlx::query("INSERT INTO questions (content, level, topic_id) VALUES ($1, $2, $3)")
            .bind(format!("A {} question", level))
            .bind(level)
            .bind(topic_id)
            .execute(pool)
            .await
            .unwrap()
            .last_insert_rowid();

    for code in ["A", "B", "C", "D"] {
        sqlx::query(
            "INSERT INTO answers (question_id, code, content, is_correct) VALUES ($1, $2, $3, $4)",
        )
        .bind(question_id)
        .bind(code)
        .bind(format!("Option {}", code))
        .bind(code == correct)
        .execute(pool)
        .await
        .unwrap();
    }

    question_id
}
