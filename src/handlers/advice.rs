use axum::extract::{Query, State};
use axum::response::Json;
use axum::Extension;
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::date_utils::{self, Period};
use crate::error::AppResult;
use crate::services::advice::{self, GoalsPlan, SavingsAdvice};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SavingsParams {
    pub period: Option<String>,
}

pub async fn savings(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<SavingsParams>,
) -> AppResult<Json<SavingsAdvice>> {
    let period = params.period.as_deref().and_then(|p| p.parse::<Period>().ok());
    let conn = state.db.get()?;
    Ok(Json(advice::compute_savings_advice(
        &conn,
        user.id,
        period,
        date_utils::today(),
    )?))
}

pub async fn goals_plan(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<GoalsPlan>> {
    let conn = state.db.get()?;
    Ok(Json(advice::compute_goals_plan(&conn, user.id, date_utils::today())?))
}
