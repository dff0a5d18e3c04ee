use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use axum::Extension;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::auth::CurrentUser;
use crate::date_utils;
use crate::error::AppResult;
use crate::services::seed::{self, SeedOptions};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SeedResponse {
    pub message: String,
    pub details: Value,
}

pub async fn load(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    payload: Option<Json<SeedOptions>>,
) -> AppResult<(StatusCode, Json<SeedResponse>)> {
    let options = payload.map(|Json(o)| o).unwrap_or_default();
    let mut conn = state.db.get()?;
    let report = seed::load_demo_data(&mut conn, user.id, &options, date_utils::today())?;

    Ok((
        StatusCode::CREATED,
        Json(SeedResponse {
            message: "Demo data loaded".into(),
            details: json!(report),
        }),
    ))
}

pub async fn clear(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<SeedResponse>> {
    warn!(user_id = user.id, "Clearing demo data");
    let conn = state.db.get()?;
    let deleted = seed::clear_demo_data(&conn, user.id)?;
    Ok(Json(SeedResponse {
        message: "Demo data cleared".into(),
        details: json!({ "deleted": deleted }),
    }))
}
