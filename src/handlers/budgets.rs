use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::Extension;
use serde::Deserialize;
use tracing::info;

use crate::auth::CurrentUser;
use crate::date_utils::parse_month;
use crate::db::queries::budgets;
use crate::error::{AppError, AppResult};
use crate::models::{Budget, NewBudget};
use crate::services::budgets::{self as utilization, BudgetSummary, UtilizationReport};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct BudgetListParams {
    #[serde(default = "default_period")]
    pub period: String,
    pub start: String,
}

fn default_period() -> String {
    "month".into()
}

#[derive(Debug, Deserialize)]
pub struct MonthParams {
    pub month: String,
}

pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<BudgetListParams>,
) -> AppResult<Json<Vec<Budget>>> {
    if params.period != "month" {
        return Err(AppError::Validation(format!(
            "Unsupported period: {}. Allowed: month",
            params.period
        )));
    }
    if parse_month(&params.start).is_none() {
        return Err(AppError::Validation("start must be in YYYY-MM format".into()));
    }

    let conn = state.db.get()?;
    Ok(Json(budgets::list_for_month(&conn, user.id, &params.start)?))
}

pub async fn upsert(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<NewBudget>,
) -> AppResult<(StatusCode, Json<Budget>)> {
    if parse_month(&payload.month).is_none() {
        return Err(AppError::Validation("month must be in YYYY-MM format".into()));
    }
    if payload.category.trim().is_empty() {
        return Err(AppError::Validation("category is required".into()));
    }
    if payload.amount_cents < 0 {
        return Err(AppError::Validation("amount must be >= 0".into()));
    }

    let conn = state.db.get()?;
    let id = budgets::upsert_budget(&conn, user.id, &payload)?;
    info!(budget_id = id, user_id = user.id, month = %payload.month, "Budget saved");

    let budget = budgets::get_budget(&conn, id)?
        .ok_or_else(|| AppError::Internal("Saved budget vanished".into()))?;
    Ok((StatusCode::CREATED, Json(budget)))
}

pub async fn summary(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<MonthParams>,
) -> AppResult<Json<BudgetSummary>> {
    let conn = state.db.get()?;
    Ok(Json(utilization::compute_summary(&conn, user.id, &params.month)?))
}

pub async fn overspending(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<MonthParams>,
) -> AppResult<Json<UtilizationReport>> {
    let conn = state.db.get()?;
    Ok(Json(utilization::compute_utilization(&conn, user.id, &params.month)?))
}
