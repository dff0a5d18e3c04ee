use axum::extract::{Query, State};
use axum::response::Json;
use axum::Extension;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::date_utils::{self, Period};
use crate::error::AppResult;
use crate::services::analytics::{self, BehaviorReport, SummaryReport};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AnalyticsParams {
    /// Unrecognized values fall back to an inferred period.
    pub period: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

pub async fn summary(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<AnalyticsParams>,
) -> AppResult<Json<SummaryReport>> {
    let period = params.period.as_deref().and_then(|p| p.parse::<Period>().ok());
    let conn = state.db.get()?;
    let report = analytics::compute_summary(
        &conn,
        user.id,
        period,
        params.start,
        params.end,
        date_utils::today(),
    )?;
    Ok(Json(report))
}

pub async fn behaviors(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<AnalyticsParams>,
) -> AppResult<Json<BehaviorReport>> {
    let conn = state.db.get()?;
    let report =
        analytics::compute_behaviors(&conn, user.id, params.start, params.end, date_utils::today())?;
    Ok(Json(report))
}
