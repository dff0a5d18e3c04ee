use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::Extension;
use tracing::info;

use crate::auth::CurrentUser;
use crate::db::queries::goals;
use crate::error::{AppError, AppResult};
use crate::models::{Goal, GoalUpdate, NewGoal};
use crate::state::AppState;

fn find_owned(conn: &rusqlite::Connection, user: CurrentUser, id: i64) -> AppResult<Goal> {
    goals::get_goal(conn, id)?
        .filter(|g| g.user_id == user.id)
        .ok_or_else(|| AppError::NotFound("Goal not found".into()))
}

fn validate(goal: &NewGoal) -> AppResult<()> {
    if goal.name.trim().is_empty() {
        return Err(AppError::Validation("name is required".into()));
    }
    if goal.target_amount_cents <= 0 {
        return Err(AppError::Validation("target_amount must be > 0".into()));
    }
    if goal.current_amount_cents < 0 {
        return Err(AppError::Validation("current_amount must be >= 0".into()));
    }
    Ok(())
}

pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<Goal>>> {
    let conn = state.db.get()?;
    Ok(Json(goals::list_goals_newest_first(&conn, user.id)?))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<NewGoal>,
) -> AppResult<(StatusCode, Json<Goal>)> {
    validate(&payload)?;
    let conn = state.db.get()?;
    let id = goals::create_goal(&conn, user.id, &payload)?;
    info!(goal_id = id, user_id = user.id, "Goal created");
    Ok((StatusCode::CREATED, Json(find_owned(&conn, user, id)?)))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<GoalUpdate>,
) -> AppResult<Json<Goal>> {
    let mut conn = state.db.get()?;
    let tx = conn.transaction()?;

    let existing = find_owned(&tx, user, id)?;
    let merged = payload.apply_to(&existing);
    validate(&merged)?;
    goals::update_goal(&tx, id, &merged)?;
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
    goals::delete_goal(&conn, id)?;
    Ok(StatusCode::NO_CONTENT)
}
