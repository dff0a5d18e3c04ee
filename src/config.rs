use std::env;
use std::path::PathBuf;

/// How API callers are resolved to a user id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMode {
    /// Every request acts on behalf of one fixed user. Useful for demos and local use.
    SingleUser(i64),
    /// Requests must carry an `Authorization: Bearer <token>` header issued by `/api/auth/login`.
    Bearer,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    pub migrations_path: PathBuf,
    pub auth_mode: AuthMode,
    pub token_ttl_minutes: i64,
}

pub const DEFAULT_USER_ID: i64 = 1;
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 60;

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let default_user_id = env::var("PENNYWISE_DEFAULT_USER_ID")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_USER_ID);

        let auth_mode = match env::var("PENNYWISE_AUTH_MODE") {
            Err(_) => AuthMode::Bearer,
            Ok(mode) => match mode.trim().to_lowercase().as_str() {
                "" | "bearer" => AuthMode::Bearer,
                "single_user" => AuthMode::SingleUser(default_user_id),
                other => {
                    panic!(
                        "Invalid PENNYWISE_AUTH_MODE '{}': expected 'bearer' or 'single_user'",
                        other
                    );
                }
            },
        };

        Self {
            host: env::var("PENNYWISE_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PENNYWISE_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            database_path: env::var("PENNYWISE_DATABASE_URL")
                .map(|v| {
                    PathBuf::from(
                        v.strip_prefix("sqlite://")
                            .or_else(|| v.strip_prefix("sqlite:"))
                            .unwrap_or(&v),
                    )
                })
                .unwrap_or_else(|_| PathBuf::from("data/pennywise.db")),
            migrations_path: env::var("PENNYWISE_MIGRATIONS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("migrations")),
            auth_mode,
            token_ttl_minutes: env::var("PENNYWISE_TOKEN_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|m: &i64| *m > 0)
                .unwrap_or(DEFAULT_TOKEN_TTL_MINUTES),
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
