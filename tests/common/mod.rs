//! Shared test utilities for integration tests.
//!
//! `TestClient` drives the real router (auth middleware included) against a
//! fresh in-memory database. Methods are intentionally broad to support the
//! various test files.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use pennywise::config::{AuthMode, Config, DEFAULT_TOKEN_TTL_MINUTES, DEFAULT_USER_ID};
use pennywise::db::create_in_memory_pool;
use pennywise::server::{build_router, prepare_database};
use pennywise::state::AppState;
use serde_json::{json, Value};
use std::path::PathBuf;
use tower::ServiceExt;

pub struct TestClient {
    state: AppState,
    token: Option<String>,
}

impl TestClient {
    /// Single-user mode acting as the default user.
    pub fn new() -> Self {
        Self::with_auth_mode(AuthMode::SingleUser(DEFAULT_USER_ID))
    }

    /// Bearer mode; requests need a token from [`TestClient::register`] or
    /// [`TestClient::login`].
    pub fn bearer() -> Self {
        Self::with_auth_mode(AuthMode::Bearer)
    }

    pub fn with_auth_mode(auth_mode: AuthMode) -> Self {
        let config = Config {
            host: "127.0.0.1".into(),
            port: 0,
            database_path: PathBuf::from(":memory:"),
            migrations_path: PathBuf::from("migrations"),
            auth_mode,
            token_ttl_minutes: DEFAULT_TOKEN_TTL_MINUTES,
        };

        let pool = create_in_memory_pool().expect("Failed to create in-memory pool");
        prepare_database(&pool, &config).expect("Failed to prepare database");

        Self {
            state: AppState::new(pool, config),
            token: None,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// A client sharing this one's database and tokens but sending `token`.
    pub fn with_token(&self, token: &str) -> Self {
        Self {
            state: self.state.clone(),
            token: Some(token.to_string()),
        }
    }

    pub fn without_token(&self) -> Self {
        Self {
            state: self.state.clone(),
            token: None,
        }
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, String) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = &self.token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8_lossy(&bytes).to_string())
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, String) {
        self.request(Method::GET, uri, None).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, String) {
        self.request(Method::DELETE, uri, None).await
    }

    /// GET and parse the body as JSON (`Value::Null` when it is not JSON).
    pub async fn get_json(&self, uri: &str) -> (StatusCode, Value) {
        let (status, body) = self.get(uri).await;
        (status, serde_json::from_str(&body).unwrap_or(Value::Null))
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let (status, body) = self.request(Method::POST, uri, Some(body)).await;
        (status, serde_json::from_str(&body).unwrap_or(Value::Null))
    }

    pub async fn put_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let (status, body) = self.request(Method::PUT, uri, Some(body)).await;
        (status, serde_json::from_str(&body).unwrap_or(Value::Null))
    }

    // =========================================================================
    // Helper methods for creating entities through the API
    // =========================================================================

    /// Register a user and return a client authenticated as them.
    pub async fn register(&self, email: &str, password: &str) -> Self {
        let (status, body) = self
            .without_token()
            .post_json(
                "/api/auth/register",
                json!({ "email": email, "password": password }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
        let token = body["access_token"].as_str().expect("access_token").to_string();
        self.with_token(&token)
    }

    pub async fn create_transaction(
        &self,
        date: &str,
        amount: f64,
        category: &str,
        kind: &str,
    ) -> i64 {
        let (status, body) = self
            .post_json(
                "/api/transactions",
                json!({ "date": date, "amount": amount, "category": category, "type": kind }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create transaction failed: {body}");
        body["id"].as_i64().expect("transaction id")
    }

    pub async fn set_budget(&self, month: &str, category: &str, amount: f64) -> Value {
        let (status, body) = self
            .post_json(
                "/api/budgets",
                json!({ "month": month, "category": category, "amount": amount }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "budget upsert failed: {body}");
        body
    }

    pub async fn create_goal(&self, name: &str, target: f64, current: f64, target_date: Option<&str>) -> i64 {
        let (status, body) = self
            .post_json(
                "/api/goals",
                json!({
                    "name": name,
                    "target_amount": target,
                    "current_amount": current,
                    "target_date": target_date,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create goal failed: {body}");
        body["id"].as_i64().expect("goal id")
    }
}

/// Today's date as `YYYY-MM-DD`, offset by `days_ago`.
pub fn days_ago(days_ago: i64) -> String {
    (chrono::Local::now().date_naive() - chrono::Duration::days(days_ago))
        .format("%Y-%m-%d")
        .to_string()
}
