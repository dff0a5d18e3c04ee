pub mod advice;
pub mod analytics;
pub mod budgets;
pub mod entries;
pub mod goals;
pub mod seed;
pub mod transactions;

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::auth;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        // Auth
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me))
        // Transactions
        .route(
            "/api/transactions",
            get(transactions::list).post(transactions::create),
        )
        .route(
            "/api/transactions/:id",
            get(transactions::show)
                .put(transactions::update)
                .delete(transactions::delete),
        )
        // Typed entries
        .route(
            "/api/expenses",
            get(entries::list_expenses).post(entries::create_expense),
        )
        .route("/api/expenses/:id", delete(entries::delete_expense))
        .route(
            "/api/income",
            get(entries::list_income).post(entries::create_income),
        )
        .route("/api/income/:id", delete(entries::delete_income))
        // Budgets and alerts
        .route("/api/budgets", get(budgets::list).post(budgets::upsert))
        .route("/api/budgets/summary", get(budgets::summary))
        .route("/api/alerts/overspending", get(budgets::overspending))
        // Goals
        .route("/api/goals", get(goals::list).post(goals::create))
        .route(
            "/api/goals/:id",
            put(goals::update).delete(goals::delete),
        )
        // Analytics and advice
        .route("/api/analytics/summary", get(analytics::summary))
        .route("/api/analytics/behaviors", get(analytics::behaviors))
        .route("/api/advice/savings", get(advice::savings))
        .route("/api/advice/goals-plan", get(advice::goals_plan))
        // Demo data
        .route("/api/seed/demo/load", post(seed::load))
        .route("/api/seed/demo/clear", delete(seed::clear))
        // Health check
        .route("/health", get(health))
}

async fn health() -> &'static str {
    "OK"
}
