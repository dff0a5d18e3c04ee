use crate::models::goal::{Goal, NewGoal};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info};

const SELECT_COLUMNS: &str = "SELECT id, user_id, name, target_amount_cents, current_amount_cents,
            target_date, created_at, updated_at
     FROM goals";

fn row_to_goal(row: &Row<'_>) -> rusqlite::Result<Goal> {
    Ok(Goal {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        target_amount_cents: row.get(3)?,
        current_amount_cents: row.get(4)?,
        target_date: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

/// Goals of a user in creation order.
pub fn list_goals(conn: &Connection, user_id: i64) -> rusqlite::Result<Vec<Goal>> {
    let mut stmt = conn.prepare(&format!(
        "{} WHERE user_id = ? ORDER BY id ASC",
        SELECT_COLUMNS
    ))?;
    let goals = stmt
        .query_map([user_id], row_to_goal)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    debug!(user_id, count = goals.len(), "Listed goals");
    Ok(goals)
}

/// Goals of a user, newest first.
pub fn list_goals_newest_first(conn: &Connection, user_id: i64) -> rusqlite::Result<Vec<Goal>> {
    let mut goals = list_goals(conn, user_id)?;
    goals.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
    Ok(goals)
}

pub fn get_goal(conn: &Connection, id: i64) -> rusqlite::Result<Option<Goal>> {
    conn.query_row(
        &format!("{} WHERE id = ?", SELECT_COLUMNS),
        [id],
        row_to_goal,
    )
    .optional()
}

pub fn create_goal(conn: &Connection, user_id: i64, goal: &NewGoal) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO goals (user_id, name, target_amount_cents, current_amount_cents, target_date)
         VALUES (?, ?, ?, ?, ?)",
        params![
            user_id,
            goal.name,
            goal.target_amount_cents,
            goal.current_amount_cents,
            goal.target_date,
        ],
    )?;
    let id = conn.last_insert_rowid();
    info!(goal_id = id, user_id, name = %goal.name, "Created goal");
    Ok(id)
}

pub fn update_goal(conn: &Connection, id: i64, goal: &NewGoal) -> rusqlite::Result<bool> {
    let rows = conn.execute(
        "UPDATE goals
         SET name = ?, target_amount_cents = ?, current_amount_cents = ?, target_date = ?,
             updated_at = datetime('now')
         WHERE id = ?",
        params![
            goal.name,
            goal.target_amount_cents,
            goal.current_amount_cents,
            goal.target_date,
            id,
        ],
    )?;
    if rows > 0 {
        info!(goal_id = id, "Updated goal");
    }
    Ok(rows > 0)
}

pub fn delete_goal(conn: &Connection, id: i64) -> rusqlite::Result<bool> {
    let rows = conn.execute("DELETE FROM goals WHERE id = ?", [id])?;
    if rows > 0 {
        info!(goal_id = id, "Deleted goal");
    }
    Ok(rows > 0)
}
