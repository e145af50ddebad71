//! Shared helpers for router-level tests

#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use gatehouse_api::{AppState, create_router};
use gatehouse_auth::{AccessGate, AccessPolicy, CredentialService, SecretHasher, TokenManager};
use gatehouse_db::{Database, UserRole};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub const JWT_SECRET: &str = "api-test-secret";
pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "admin-password";

pub struct TestApp {
    pub router: Router,
    pub db: Database,
    pub credentials: CredentialService,
}

impl TestApp {
    /// Build the production router over a fresh in-memory store, using a
    /// cheap hash work factor.
    pub async fn spawn() -> Self {
        let db = Database::in_memory().await.expect("in-memory database");
        let tokens = Arc::new(TokenManager::new(JWT_SECRET));
        let credentials = CredentialService::new(
            db.clone(),
            SecretHasher::new(1, 64).expect("hasher"),
            tokens.clone(),
        );
        let gate = Arc::new(AccessGate::new(AccessPolicy::default(), tokens));
        let state = AppState::new(db.clone(), credentials.clone(), gate);

        Self {
            router: create_router(state, None),
            db,
            credentials,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        send(self.router.clone(), request).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    /// Create an admin account directly in the store and log it in
    pub async fn admin_token(&self) -> String {
        self.credentials
            .create_account("Admin", ADMIN_EMAIL, Some(ADMIN_PASSWORD), UserRole::Admin)
            .await
            .expect("admin account");
        self.login(ADMIN_EMAIL, ADMIN_PASSWORD).await
    }

    /// Register a regular user through the API and log it in
    pub async fn user_token(&self, email: &str) -> String {
        let (status, _) = self
            .post(
                "/api/auth/register",
                None,
                serde_json::json!({ "name": "Regular", "email": email, "password": "user-password" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        self.login(email, "user-password").await
    }

    pub async fn login(&self, email: &str, password: &str) -> String {
        let (status, body) = self
            .post(
                "/api/auth/login",
                None,
                serde_json::json!({ "email": email, "password": password }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        body["token"].as_str().expect("token").to_string()
    }
}

pub async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.expect("infallible router");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}
