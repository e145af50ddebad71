mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn register_returns_public_fields() {
    let app = TestApp::spawn().await;

    let (status, body) = app
        .post(
            "/api/auth/register",
            None,
            json!({ "name": "Alice", "email": "alice@example.com", "password": "hunter2hunter2" }),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "Alice");
    assert_eq!(body["email"], "alice@example.com");
    assert_eq!(body["role"], "USER");
    assert!(body["id"].as_str().is_some_and(|id| !id.is_empty()));
    assert!(body.get("password").is_none());
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn register_duplicate_email_is_rejected() {
    let app = TestApp::spawn().await;
    let request = json!({ "name": "Alice", "email": "alice@example.com", "password": "hunter2hunter2" });

    let (status, _) = app.post("/api/auth/register", None, request.clone()).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.post("/api/auth/register", None, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "User with this email already exists" }));
    assert_eq!(app.db.count_users().await.unwrap(), 1);
}

#[tokio::test]
async fn concurrent_registrations_create_exactly_one_user() {
    let app = TestApp::spawn().await;
    const ATTEMPTS: usize = 8;

    let handles = (0..ATTEMPTS).map(|i| {
        let router = app.router.clone();
        tokio::spawn(async move {
            let request = axum::http::Request::builder()
                .method(Method::POST)
                .uri("/api/auth/register")
                .header("content-type", "application/json")
                .body(axum::body::Body::from(
                    json!({
                        "name": format!("Racer {}", i),
                        "email": "race@example.com",
                        "password": "racing-password"
                    })
                    .to_string(),
                ))
                .unwrap();
            common::send(router, request).await
        })
    });

    let results: Vec<_> = futures::future::join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    let created = results.iter().filter(|(s, _)| *s == StatusCode::CREATED).count();
    let duplicates = results
        .iter()
        .filter(|(s, body)| {
            *s == StatusCode::BAD_REQUEST && body["error"] == "User with this email already exists"
        })
        .count();

    assert_eq!(created, 1);
    assert_eq!(duplicates, ATTEMPTS - 1);
    assert_eq!(app.db.count_users().await.unwrap(), 1);
}

#[tokio::test]
async fn register_validates_input() {
    let app = TestApp::spawn().await;

    let (status, body) = app
        .post(
            "/api/auth/register",
            None,
            json!({ "name": "Alice", "email": "not-an-email", "password": "hunter2hunter2" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = app
        .post(
            "/api/auth/register",
            None,
            json!({ "name": "Alice", "email": "alice@example.com", "password": "short" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.db.count_users().await.unwrap(), 0);
}

#[tokio::test]
async fn malformed_body_gets_json_error() {
    let app = TestApp::spawn().await;

    let (status, body) = app
        .post("/api/auth/register", None, json!({ "name": "Alice" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid request body"));
}

#[tokio::test]
async fn login_returns_token_and_profile() {
    let app = TestApp::spawn().await;
    app.post(
        "/api/auth/register",
        None,
        json!({ "name": "Alice", "email": "alice@example.com", "password": "hunter2hunter2" }),
    )
    .await;

    let (status, body) = app
        .post(
            "/api/auth/login",
            None,
            json!({ "email": "alice@example.com", "password": "hunter2hunter2" }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].as_str().is_some_and(|t| t.split('.').count() == 3));
    assert_eq!(body["user"]["email"], "alice@example.com");
    assert_eq!(body["user"]["role"], "USER");
    assert_eq!(body["expires_in"], 604_800);
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let app = TestApp::spawn().await;
    app.post(
        "/api/auth/register",
        None,
        json!({ "name": "Alice", "email": "alice@example.com", "password": "hunter2hunter2" }),
    )
    .await;

    let wrong_password = app
        .post(
            "/api/auth/login",
            None,
            json!({ "email": "alice@example.com", "password": "wrong-password" }),
        )
        .await;
    let unknown_user = app
        .post(
            "/api/auth/login",
            None,
            json!({ "email": "nobody@example.com", "password": "hunter2hunter2" }),
        )
        .await;

    assert_eq!(wrong_password.0, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password, unknown_user);
    assert_eq!(wrong_password.1, json!({ "error": "Invalid credentials" }));
}

#[tokio::test]
async fn admin_creates_and_fetches_user() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;

    let (status, created) = app
        .post(
            "/api/users",
            Some(&token),
            json!({ "name": "Bob", "email": "bob@example.com" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["role"], "USER");

    let id = created["id"].as_str().unwrap();
    let (status, fetched) = app.get(&format!("/api/users/{}", id), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["email"], "bob@example.com");

    let (status, list) = app.get("/api/users", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn admin_created_user_without_password_cannot_log_in() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;

    app.post(
        "/api/users",
        Some(&token),
        json!({ "name": "Bob", "email": "bob@example.com" }),
    )
    .await;

    let (status, _) = app
        .post(
            "/api/auth/login",
            None,
            json!({ "email": "bob@example.com", "password": "" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_create_duplicate_is_rejected() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;

    let (status, body) = app
        .post(
            "/api/users",
            Some(&token),
            json!({ "name": "Again", "email": common::ADMIN_EMAIL }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "User with this email already exists");
}

#[tokio::test]
async fn missing_user_is_not_found() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;

    let (status, body) = app.get("/api/users/does-not-exist", Some(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "User not found" }));
}

#[tokio::test]
async fn database_health_reports_user_count() {
    let app = TestApp::spawn().await;
    app.admin_token().await;

    let (status, body) = app.get("/api/health/db", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["stats"]["user_count"], 1);
}

#[tokio::test]
async fn store_failure_during_registration_is_opaque() {
    let app = TestApp::spawn().await;
    app.db.close().await;

    let (status, body) = app
        .post(
            "/api/auth/register",
            None,
            json!({ "name": "Alice", "email": "alice@example.com", "password": "hunter2hunter2" }),
        )
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to register user" }));
}

#[tokio::test]
async fn store_failure_on_user_routes_is_opaque() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;
    app.db.close().await;

    let (status, body) = app.get("/api/users", Some(&token)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Internal server error" }));

    let (status, body) = app
        .post(
            "/api/users",
            Some(&token),
            json!({ "name": "Bob", "email": "bob@example.com" }),
        )
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Internal error" }));
}

#[tokio::test]
async fn store_failure_on_database_health_reports_unavailable() {
    let app = TestApp::spawn().await;
    app.db.close().await;

    let (status, body) = app.get("/api/health/db", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Failed to connect to database");
}
