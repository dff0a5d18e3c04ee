//! Integration tests for registration, login and bearer-token handling.

mod common;

use axum::http::StatusCode;
use common::TestClient;
use serde_json::json;

#[tokio::test]
async fn test_api_requires_token_in_bearer_mode() {
    let client = TestClient::bearer();

    let (status, body) = client.get_json("/api/transactions").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Not authenticated");

    let (status, _) = client.with_token("bogus").get("/api/goals").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health_is_public() {
    let client = TestClient::bearer();
    let (status, body) = client.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");
}

#[tokio::test]
async fn test_register_login_me_logout() {
    let server = TestClient::bearer();
    let registered = server.register("Carol@Example.com", "correct-horse").await;

    let (status, me) = registered.get_json("/api/auth/me").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "carol@example.com");

    let (status, token) = server
        .post_json(
            "/api/auth/login",
            json!({ "email": "carol@example.com", "password": "correct-horse" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(token["token_type"], "bearer");
    assert_eq!(token["expires_in"], 3600);

    let session = server.with_token(token["access_token"].as_str().unwrap());
    let (status, again) = session.get_json("/api/auth/me").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(again["id"], me["id"]);

    let (status, _) = session.request(axum::http::Method::POST, "/api/auth/logout", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = session.get("/api/auth/me").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Other sessions stay valid
    let (status, _) = registered.get("/api/auth/me").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_register_validation() {
    let client = TestClient::bearer();

    let (status, _) = client
        .post_json("/api/auth/register", json!({ "email": "nobody", "password": "long-enough" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = client
        .post_json("/api/auth/register", json!({ "email": "a@b.c", "password": "short" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    client.register("dave@example.com", "password1").await;
    let (status, body) = client
        .post_json(
            "/api/auth/register",
            json!({ "email": "dave@example.com", "password": "password2" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Email already registered");
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let client = TestClient::bearer();
    client.register("erin@example.com", "password1").await;

    for (email, password) in [
        ("erin@example.com", "wrong-password"),
        ("nobody@example.com", "password1"),
    ] {
        let (status, body) = client
            .post_json("/api/auth/login", json!({ "email": email, "password": password }))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{email}");
        assert_eq!(body["detail"], "Invalid credentials");
    }
}

#[tokio::test]
async fn test_single_user_mode_needs_no_token() {
    let client = TestClient::new();

    let (status, me) = client.get_json("/api/auth/me").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["id"], 1);
    assert_eq!(me["email"], "demo@user");
}
