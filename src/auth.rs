//! Authentication middleware and handlers.
//!
//! Users register with an email and password (hashed with Argon2). Logging in
//! issues an opaque bearer token: a random UUID validated against a
//! server-side token store. Tokens expire after the configured TTL and are
//! invalidated on logout or server restart.
//!
//! In single-user mode no credentials are checked and every API request acts
//! on behalf of the configured default user.

use std::collections::HashMap;
use std::sync::Mutex;

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Json, Response};
use axum::Extension;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::AuthMode;
use crate::db::queries::users;
use crate::error::{AppError, AppResult};
use crate::models::NewUser;
use crate::state::AppState;

const MIN_PASSWORD_LEN: usize = 6;

/// Paths under `/api` that are reachable without credentials.
const PUBLIC_API_PATHS: [&str; 2] = ["/api/auth/register", "/api/auth/login"];

/// The user a request acts on behalf of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: i64,
}

#[derive(Debug, Clone)]
struct TokenEntry {
    user_id: i64,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedToken {
    pub access_token: String,
    pub token_type: String,
    /// Lifetime in seconds.
    pub expires_in: i64,
}

/// Server-side store of live bearer tokens.
#[derive(Debug)]
pub struct TokenStore {
    ttl: Duration,
    tokens: Mutex<HashMap<String, TokenEntry>>,
}

impl TokenStore {
    pub fn new(ttl_minutes: i64) -> Self {
        Self {
            ttl: Duration::minutes(ttl_minutes),
            tokens: Mutex::new(HashMap::new()),
        }
    }

    /// Issue a new token for `user_id`, dropping every expired one first.
    pub fn issue(&self, user_id: i64) -> IssuedToken {
        let token = Uuid::new_v4().to_string();
        let now = Utc::now();
        let entry = TokenEntry {
            user_id,
            expires_at: now + self.ttl,
        };

        let mut tokens = self.tokens.lock().unwrap_or_else(|e| e.into_inner());
        let before = tokens.len();
        tokens.retain(|_, e| e.expires_at > now);
        if tokens.len() < before {
            debug!(evicted = before - tokens.len(), "Evicted expired tokens");
        }
        tokens.insert(token.clone(), entry);
        drop(tokens);

        IssuedToken {
            access_token: token,
            token_type: "bearer".into(),
            expires_in: self.ttl.num_seconds(),
        }
    }

    /// The user owning `token`, if it exists and has not expired.
    pub fn resolve(&self, token: &str) -> Option<i64> {
        let mut tokens = self.tokens.lock().unwrap_or_else(|e| e.into_inner());
        let TokenEntry {
            user_id,
            expires_at,
        } = tokens.get(token)?.clone();
        if expires_at <= Utc::now() {
            tokens.remove(token);
            return None;
        }
        Some(user_id)
    }

    pub fn revoke(&self, token: &str) -> bool {
        self.tokens
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(token)
            .is_some()
    }
}

fn bearer_token(request: &Request<Body>) -> Option<&str> {
    let value = request.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

fn not_authenticated() -> Response {
    AppError::Unauthorized("Not authenticated".into()).into_response()
}

/// Resolve the caller of every `/api` route into a [`CurrentUser`] extension.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path();
    if !path.starts_with("/api/") || PUBLIC_API_PATHS.contains(&path) {
        return next.run(request).await;
    }

    let user_id = match state.config.auth_mode {
        AuthMode::SingleUser(id) => id,
        AuthMode::Bearer => {
            let Some(token) = bearer_token(&request) else {
                return not_authenticated();
            };
            match state.tokens.resolve(token) {
                Some(id) => id,
                None => {
                    debug!("Rejected unknown or expired token");
                    return not_authenticated();
                }
            }
        }
    };

    request.extensions_mut().insert(CurrentUser { id: user_id });
    next.run(request).await
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::encode_b64(Uuid::new_v4().as_bytes())
        .map_err(|e| AppError::Internal(format!("Failed to build salt: {}", e)))?;
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

/// Verify a password against an Argon2 hash.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        tracing::error!("Invalid stored password hash format");
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct Me {
    pub id: i64,
    pub email: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> AppResult<(StatusCode, Json<IssuedToken>)> {
    let email = credentials.email.trim().to_lowercase();
    if !email.contains('@') {
        return Err(AppError::Validation("A valid email is required".into()));
    }
    if credentials.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    let conn = state.db.get()?;
    if users::find_by_email(&conn, &email)?.is_some() {
        return Err(AppError::Validation("Email already registered".into()));
    }

    let password_hash = hash_password(&credentials.password)?;
    let user_id = users::create_user(
        &conn,
        &NewUser {
            email,
            password_hash: Some(password_hash),
        },
    )?;
    info!(user_id, "Registered user");

    Ok((StatusCode::CREATED, Json(state.tokens.issue(user_id))))
}

pub async fn login(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> AppResult<Json<IssuedToken>> {
    let email = credentials.email.trim().to_lowercase();
    let conn = state.db.get()?;

    let user = users::find_by_email(&conn, &email)?;
    let verified = user.as_ref().and_then(|u| {
        u.password_hash
            .as_deref()
            .filter(|hash| verify_password(&credentials.password, hash))
            .map(|_| u.id)
    });

    match verified {
        Some(user_id) => {
            info!(user_id, "User logged in");
            Ok(Json(state.tokens.issue(user_id)))
        }
        None => {
            warn!("Failed login attempt");
            Err(AppError::Unauthorized("Invalid credentials".into()))
        }
    }
}

pub async fn logout(State(state): State<AppState>, request: Request<Body>) -> StatusCode {
    if let Some(token) = bearer_token(&request) {
        state.tokens.revoke(token);
    }
    StatusCode::NO_CONTENT
}

pub async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<Me>> {
    let conn = state.db.get()?;
    let found = users::get_user(&conn, user.id)?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    Ok(Json(Me {
        id: found.id,
        email: found.email,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_resolve() {
        let store = TokenStore::new(60);
        let issued = store.issue(7);
        assert_eq!(issued.token_type, "bearer");
        assert_eq!(issued.expires_in, 3600);
        assert_eq!(store.resolve(&issued.access_token), Some(7));
        assert_eq!(store.resolve("not-a-token"), None);
    }

    #[test]
    fn test_revoke() {
        let store = TokenStore::new(60);
        let issued = store.issue(1);
        assert!(store.revoke(&issued.access_token));
        assert!(!store.revoke(&issued.access_token));
        assert_eq!(store.resolve(&issued.access_token), None);
    }

    #[test]
    fn test_expired_tokens_are_evicted() {
        let store = TokenStore::new(0);
        let issued = store.issue(1);
        assert_eq!(store.resolve(&issued.access_token), None);
        assert!(!store.revoke(&issued.access_token));
    }

    #[test]
    fn test_issue_sweeps_expired_tokens() {
        let store = TokenStore::new(60);
        let live = store.issue(1);
        store.tokens.lock().unwrap().insert(
            "stale".into(),
            TokenEntry {
                user_id: 2,
                expires_at: Utc::now() - Duration::minutes(1),
            },
        );

        let fresh = store.issue(3);
        let tokens = store.tokens.lock().unwrap();
        assert_eq!(tokens.len(), 2);
        assert!(!tokens.contains_key("stale"));
        assert!(tokens.contains_key(&live.access_token));
        assert!(tokens.contains_key(&fresh.access_token));
    }

    #[test]
    fn test_password_hash_roundtrip() {
        let hash = hash_password("hunter22").unwrap();
        assert!(verify_password("hunter22", &hash));
        assert!(!verify_password("hunter23", &hash));
        assert!(!verify_password("hunter22", "not-a-hash"));
    }
}
