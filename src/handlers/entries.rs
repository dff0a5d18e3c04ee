//! Typed views over transactions: `/api/expenses` and `/api/income` share
//! this logic and differ only in the transaction type they manage.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::Extension;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;

use crate::auth::CurrentUser;
use crate::date_utils::next_month_start;
use crate::db::queries::transactions::{self, TransactionFilter};
use crate::error::{AppError, AppResult};
use crate::models::money::as_amount;
use crate::models::{NewTransaction, Transaction, TransactionType};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct EntryPayload {
    pub date: NaiveDate,
    #[serde(rename = "amount", with = "as_amount")]
    pub amount_cents: i64,
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EntryListParams {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub category: Option<String>,
}

fn label(kind: TransactionType) -> &'static str {
    match kind {
        TransactionType::Expense => "Expense",
        TransactionType::Income => "Income",
    }
}

impl EntryListParams {
    /// `month` narrows the filter only when `year` is given too.
    fn to_filter(&self, kind: TransactionType) -> AppResult<TransactionFilter> {
        let mut filter = TransactionFilter {
            kind: Some(kind),
            category: self.category.clone(),
            ..Default::default()
        };

        if let Some(month) = self.month {
            if !(1..=12).contains(&month) {
                return Err(AppError::Validation("month must be between 1 and 12".into()));
            }
        }

        let Some(year) = self.year else {
            return Ok(filter);
        };
        let invalid_year = || AppError::Validation("year is out of range".into());

        match self.month {
            Some(month) => {
                let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid_year)?;
                filter.from_date = Some(start);
                filter.before_date = Some(next_month_start(start));
            }
            None => {
                filter.from_date = Some(NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(invalid_year)?);
                filter.to_date = Some(NaiveDate::from_ymd_opt(year, 12, 31).ok_or_else(invalid_year)?);
            }
        }
        Ok(filter)
    }
}

pub(crate) fn create(
    state: &AppState,
    user: CurrentUser,
    kind: TransactionType,
    payload: EntryPayload,
) -> AppResult<(StatusCode, Json<Transaction>)> {
    if payload.amount_cents <= 0 {
        return Err(AppError::Validation(format!(
            "amount must be > 0 for {}",
            kind.as_str()
        )));
    }

    let conn = state.db.get()?;
    let new_transaction = NewTransaction {
        date: payload.date,
        amount_cents: payload.amount_cents,
        category: payload.category,
        description: payload.description,
        kind,
    };
    let id = transactions::create_transaction(&conn, user.id, &new_transaction)?;
    info!(transaction_id = id, user_id = user.id, %kind, "Created entry");

    let created = transactions::get_transaction(&conn, id)?
        .ok_or_else(|| AppError::Internal("Created transaction vanished".into()))?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub(crate) fn list(
    state: &AppState,
    user: CurrentUser,
    kind: TransactionType,
    params: &EntryListParams,
) -> AppResult<Json<Vec<Transaction>>> {
    let filter = params.to_filter(kind)?;
    let conn = state.db.get()?;
    Ok(Json(transactions::list_transactions(&conn, user.id, &filter)?))
}

pub(crate) fn delete(
    state: &AppState,
    user: CurrentUser,
    kind: TransactionType,
    id: i64,
) -> AppResult<StatusCode> {
    let conn = state.db.get()?;
    let existing = transactions::get_transaction(&conn, id)?
        .filter(|t| t.kind == kind)
        .ok_or_else(|| AppError::NotFound(format!("{} not found", label(kind))))?;
    if existing.user_id != user.id {
        return Err(AppError::Forbidden("Forbidden".into()));
    }

    transactions::delete_transaction(&conn, id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_expense(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<EntryPayload>,
) -> AppResult<(StatusCode, Json<Transaction>)> {
    create(&state, user, TransactionType::Expense, payload)
}

pub async fn list_expenses(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<EntryListParams>,
) -> AppResult<Json<Vec<Transaction>>> {
    list(&state, user, TransactionType::Expense, &params)
}

pub async fn delete_expense(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    delete(&state, user, TransactionType::Expense, id)
}

pub async fn create_income(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<EntryPayload>,
) -> AppResult<(StatusCode, Json<Transaction>)> {
    create(&state, user, TransactionType::Income, payload)
}

pub async fn list_income(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<EntryListParams>,
) -> AppResult<Json<Vec<Transaction>>> {
    list(&state, user, TransactionType::Income, &params)
}

pub async fn delete_income(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    delete(&state, user, TransactionType::Income, id)
}
