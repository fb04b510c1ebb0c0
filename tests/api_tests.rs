// tests/api_tests.rs
//
// Auth, taxonomy, question-bank, prompt-template, dashboard and AI-proxy
// endpoint coverage.

mod common;

use common::{seed_topic, spawn_app, staff_token};
use uuid::Uuid;

#[tokio::test]
async fn unknown_path_returns_404() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/no/such/route", address))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn health_check_works() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/health", address))
        .send()
        .await
        .expect("Failed to execute request");
    assert!(response.status().is_success());
}

#[tokio::test]
async fn register_returns_201_and_hides_password() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();

    let username = format!("teacher-{}", Uuid::new_v4());
    let response = client
        .post(format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "password": "password",
            "fullName": "Jane Doe",
            "role": "ROLE_TEACHER"
        }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 201);

    let body = response.text().await.unwrap();
    assert!(!body.contains("password"), "response leaked the password field: {}", body);

    let user: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(user["username"], username.as_str());
    assert_eq!(user["role"], "TEACHER");
}

#[tokio::test]
async fn register_rejects_invalid_payloads() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();

    // username too short, email malformed, password too short
    for payload in [
        serde_json::json!({ "username": "ab", "email": "a@b.com", "password": "password" }),
        serde_json::json!({ "username": "validname", "email": "not-an-email", "password": "password" }),
        serde_json::json!({ "username": "validname", "email": "a@b.com", "password": "abc" }),
    ] {
        let response = client
            .post(format!("{}/api/auth/register", address))
            .json(&payload)
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status().as_u16(), 400, "payload: {}", payload);
    }
}

#[tokio::test]
async fn register_duplicate_username_conflicts() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();

    let username = format!("dup-{}", Uuid::new_v4());
    for (attempt, expected) in [(1, 201), (2, 409)] {
        let response = client
            .post(format!("{}/api/auth/register", address))
            .json(&serde_json::json!({
                "username": username,
                "email": format!("{}-{}@example.com", username, attempt),
                "password": "password"
            }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status().as_u16(), expected);
    }
}

#[tokio::test]
async fn login_returns_bearer_token_with_role() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();

    let username = format!("login-{}", Uuid::new_v4());
    client
        .post(format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "password": "password"
        }))
        .send()
        .await
        .unwrap();

    let response = client
        .post(format!("{}/api/auth/login", address))
        .json(&serde_json::json!({ "username": username, "password": "password" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert!(!body["token"].as_str().unwrap().is_empty());
    assert_eq!(body["type"], "Bearer");
    assert_eq!(body["role"], "TEACHER");
}

#[tokio::test]
async fn login_with_wrong_password_is_unauthorized() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();

    let username = format!("wrongpw-{}", Uuid::new_v4());
    client
        .post(format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "password": "password"
        }))
        .send()
        .await
        .unwrap();

    let response = client
        .post(format!("{}/api/auth/login", address))
        .json(&serde_json::json!({ "username": username, "password": "nope" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn staff_routes_require_a_token() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();

    for path in ["/api/questions", "/api/subjects", "/api/exams", "/api/dashboard/stats"] {
        let response = client
            .get(format!("{}{}", address, path))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status().as_u16(), 401, "path: {}", path);
    }
}

#[tokio::test]
async fn student_tokens_are_rejected_on_staff_routes() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();

    let username = format!("student-{}", Uuid::new_v4());
    client
        .post(format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "password": "password",
            "role": "STUDENT"
        }))
        .send()
        .await
        .unwrap();

    let login: serde_json::Value = client
        .post(format!("{}/api/auth/login", address))
        .json(&serde_json::json!({ "username": username, "password": "password" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let token = login["token"].as_str().unwrap();

    let response = client
        .get(format!("{}/api/questions", address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 403);
}

#[tokio::test]
async fn taxonomy_crud_and_delete_protection() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let token = staff_token(&client, &address).await;

    let subject: serde_json::Value = client
        .post(format!("{}/api/subjects", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({ "name": "Chemistry" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let grade: serde_json::Value = client
        .post(format!("{}/api/grades", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({ "name": "Grade 11" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let topic_response = client
        .post(format!("{}/api/topics", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({
            "title": "Alkenes",
            "subjectId": subject["id"].as_i64().unwrap(),
            "gradeId": grade["id"].as_i64().unwrap()
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(topic_response.status().as_u16(), 201);
    let topic: serde_json::Value = topic_response.json().await.unwrap();

    // a subject with topics cannot be removed
    let blocked = client
        .delete(format!("{}/api/subjects/{}", address, subject["id"].as_i64().unwrap()))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(blocked.status().as_u16(), 409);

    let removed = client
        .delete(format!("{}/api/topics/{}", address, topic["id"].as_i64().unwrap()))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(removed.status().as_u16(), 204);

    let now_allowed = client
        .delete(format!("{}/api/subjects/{}", address, subject["id"].as_i64().unwrap()))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(now_allowed.status().as_u16(), 204);
}

fn question_payload(topic_id: i64) -> serde_json::Value {
    serde_json::json!({
        "content": "Which gas turns limewater milky?",
        "level": "EASY",
        "topicId": topic_id,
        "answers": [
            { "code": "A", "content": "Oxygen", "isCorrect": false },
            { "code": "B", "content": "Carbon dioxide", "isCorrect": true },
            { "code": "C", "content": "Nitrogen", "isCorrect": false },
            { "code": "D", "content": "Hydrogen", "isCorrect": false }
        ]
    })
}

#[tokio::test]
async fn question_crud_flow() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let token = staff_token(&client, &address).await;
    let topic_id = seed_topic(&pool).await;

    let created_response = client
        .post(format!("{}/api/questions", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&question_payload(topic_id))
        .send()
        .await
        .unwrap();
    assert_eq!(created_response.status().as_u16(), 201);
    let created: serde_json::Value = created_response.json().await.unwrap();
    let question_id = created["id"].as_i64().unwrap();
    assert_eq!(created["answers"].as_array().unwrap().len(), 4);

    let fetched: serde_json::Value = client
        .get(format!("{}/api/questions/{}", address, question_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched["level"], "EASY");

    // update replaces the answer set
    let mut updated_payload = question_payload(topic_id);
    updated_payload["level"] = serde_json::json!("HARD");
    updated_payload["answers"] = serde_json::json!([
        { "code": "A", "content": "True", "isCorrect": true },
        { "code": "B", "content": "False", "isCorrect": false }
    ]);
    let updated_response = client
        .put(format!("{}/api/questions/{}", address, question_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&updated_payload)
        .send()
        .await
        .unwrap();
    assert_eq!(updated_response.status().as_u16(), 200);
    let updated: serde_json::Value = updated_response.json().await.unwrap();
    assert_eq!(updated["level"], "HARD");
    assert_eq!(updated["answers"].as_array().unwrap().len(), 2);

    let listed: serde_json::Value = client
        .get(format!("{}/api/questions", address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let deleted = client
        .delete(format!("{}/api/questions/{}", address, question_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status().as_u16(), 204);

    let gone = client
        .get(format!("{}/api/questions/{}", address, question_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(gone.status().as_u16(), 404);
}

#[tokio::test]
async fn question_with_two_correct_answers_is_rejected() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let token = staff_token(&client, &address).await;
    let topic_id = seed_topic(&pool).await;

    let mut payload = question_payload(topic_id);
    payload["answers"][0]["isCorrect"] = serde_json::json!(true);

    let response = client
        .post(format!("{}/api/questions", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&payload)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn question_content_is_sanitized() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let token = staff_token(&client, &address).await;
    let topic_id = seed_topic(&pool).await;

    let mut payload = question_payload(topic_id);
    payload["content"] =
        serde_json::json!("<script>alert('x')</script>What is <b>water</b>?");

    let created: serde_json::Value = client
        .post(format!("{}/api/questions", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&payload)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let content = created["content"].as_str().unwrap();
    assert!(!content.contains("<script>"));
    assert!(content.contains("water"));
}

#[tokio::test]
async fn prompt_template_crud_and_lookup_by_name() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let token = staff_token(&client, &address).await;

    let created_response = client
        .post(format!("{}/api/prompts", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({
            "name": "question_generation_mcq",
            "content": "Write one {level} MCQ about {topic}."
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(created_response.status().as_u16(), 201);
    let created: serde_json::Value = created_response.json().await.unwrap();

    // duplicate names conflict
    let duplicate = client
        .post(format!("{}/api/prompts", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({ "name": "question_generation_mcq", "content": "x" }))
        .send()
        .await
        .unwrap();
    assert_eq!(duplicate.status().as_u16(), 409);

    let by_name: serde_json::Value = client
        .get(format!("{}/api/prompts/question_generation_mcq", address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(by_name["id"], created["id"]);

    let missing = client
        .get(format!("{}/api/prompts/no_such_template", address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status().as_u16(), 404);

    let deleted = client
        .delete(format!("{}/api/prompts/{}", address, created["id"].as_i64().unwrap()))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status().as_u16(), 204);
}

#[tokio::test]
async fn dashboard_reports_totals() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let token = staff_token(&client, &address).await;

    let topic_id = seed_topic(&pool).await;
    common::seed_question(&pool, topic_id, "EASY", "A").await;

    let stats: serde_json::Value = client
        .get(format!("{}/api/dashboard/stats", address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(stats["totalQuestions"], 1);
    assert_eq!(stats["totalExams"], 0);
    assert_eq!(stats["totalResults"], 0);

    let activities = stats["activities"].as_array().unwrap();
    assert_eq!(activities.len(), 1);
    assert_eq!(activities[0]["type"], "QUESTION");
}

#[tokio::test]
async fn ai_generation_without_api_key_is_bad_gateway() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let token = staff_token(&client, &address).await;

    let response = client
        .post(format!("{}/api/ai/generate-question", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({
            "topic": "Alkenes",
            "level": "EASY",
            "subject": "Chemistry",
            "grade": "Grade 11"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 502);
}
