use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::Extension;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, info};

use crate::auth::CurrentUser;
use crate::db::queries::transactions::{self, TransactionFilter};
use crate::error::{AppError, AppResult};
use crate::models::{NewTransaction, Transaction, TransactionUpdate};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TransactionListParams {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub category: Option<String>,
}

/// Rows owned by someone else are reported as missing.
fn find_owned(conn: &rusqlite::Connection, user: CurrentUser, id: i64) -> AppResult<Transaction> {
    transactions::get_transaction(conn, id)?
        .filter(|t| t.user_id == user.id)
        .ok_or_else(|| AppError::NotFound("Transaction not found".into()))
}

pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<TransactionListParams>,
) -> AppResult<Json<Vec<Transaction>>> {
    let conn = state.db.get()?;
    let filter = TransactionFilter {
        category: params.category,
        from_date: params.start,
        to_date: params.end,
        ..Default::default()
    };
    Ok(Json(transactions::list_transactions(&conn, user.id, &filter)?))
}

pub async fn show(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<Transaction>> {
    let conn = state.db.get()?;
    Ok(Json(find_owned(&conn, user, id)?))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<NewTransaction>,
) -> AppResult<(StatusCode, Json<Transaction>)> {
    debug!(user_id = user.id, category = %payload.category, "Creating transaction");
    let mut conn = state.db.get()?;
    let tx = conn.transaction()?;

    let id = transactions::create_transaction(&tx, user.id, &payload)?;
    let created = find_owned(&tx, user, id)?;
    tx.commit()?;

    info!(transaction_id = id, user_id = user.id, "Transaction created");
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<TransactionUpdate>,
) -> AppResult<Json<Transaction>> {
    debug!(transaction_id = id, "Updating transaction");
    let mut conn = state.db.get()?;
    let tx = conn.transaction()?;

    let existing = find_owned(&tx, user, id)?;
    transactions::update_transaction(&tx, id, &payload.apply_to(&existing))?;
    let updated = find_owned(&tx, user, id)?;
    tx.commit()?;

    Ok(Json(updated))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    let conn = state.db.get()?;
    find_owned(&conn, user, id)?;
    transactions::delete_transaction(&conn, id)?;
    Ok(StatusCode::NO_CONTENT)
}
