use axum::middleware;
use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use crate::auth;
use crate::config::{AuthMode, Config, DEFAULT_USER_ID};
use crate::db::queries::users;
use crate::db::{create_pool, migrations, DbPool};
use crate::handlers;
use crate::state::AppState;

/// Assemble the router and middleware stack around an existing state.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(handlers::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run migrations on `db` and make sure the single-user account exists.
pub fn prepare_database(db: &DbPool, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let conn = db.get()?;
    migrations::run_migrations(&conn, &config.migrations_path)?;

    if let AuthMode::SingleUser(id) = config.auth_mode {
        let email = if id == DEFAULT_USER_ID {
            "demo@user".to_string()
        } else {
            format!("demo+{}@user", id)
        };
        users::ensure_user(&conn, id, &email)?;
        tracing::info!(user_id = id, "Running in single-user mode");
    }
    Ok(())
}

/// Build the application state and Axum router from a [`Config`].
///
/// Creates the database pool, runs migrations and assembles the full
/// middleware stack.
pub fn build_app(config: Config) -> Result<(AppState, Router), Box<dyn std::error::Error>> {
    let db = create_pool(&config.database_path)?;
    prepare_database(&db, &config)?;

    let state = AppState::new(db, config);
    let app = build_router(state.clone());
    Ok((state, app))
}

/// Bind the router to `host:port` and spawn the server as a tokio task.
///
/// Returns the actual port the server bound to (useful when `port` is 0 for
/// OS-assigned ports) and a [`JoinHandle`] for the server task.
pub async fn serve(
    app: Router,
    host: &str,
    port: u16,
) -> Result<(u16, JoinHandle<()>), Box<dyn std::error::Error>> {
    let addr = format!("{host}:{port}");
    let listener = TcpListener::bind(&addr).await?;
    let actual_port = listener.local_addr()?.port();

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "Server error");
        }
    });

    Ok((actual_port, handle))
}
