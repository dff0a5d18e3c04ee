use crate::models::budget::{Budget, NewBudget};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info};

fn row_to_budget(row: &Row<'_>) -> rusqlite::Result<Budget> {
    Ok(Budget {
        id: row.get(0)?,
        user_id: row.get(1)?,
        month: row.get(2)?,
        category: row.get(3)?,
        amount_cents: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

pub fn list_for_month(
    conn: &Connection,
    user_id: i64,
    month: &str,
) -> rusqlite::Result<Vec<Budget>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, month, category, amount_cents, created_at, updated_at
         FROM budgets
         WHERE user_id = ? AND month = ?
         ORDER BY category ASC, id ASC",
    )?;

    let budgets = stmt
        .query_map(params![user_id, month], row_to_budget)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    debug!(user_id, month, count = budgets.len(), "Listed budgets");
    Ok(budgets)
}

pub fn get_budget(conn: &Connection, id: i64) -> rusqlite::Result<Option<Budget>> {
    conn.query_row(
        "SELECT id, user_id, month, category, amount_cents, created_at, updated_at
         FROM budgets WHERE id = ?",
        [id],
        row_to_budget,
    )
    .optional()
}

/// Insert a budget, or replace the amount of the existing one for the same
/// (user, month, category). Returns the row id.
pub fn upsert_budget(conn: &Connection, user_id: i64, budget: &NewBudget) -> rusqlite::Result<i64> {
    let id: i64 = conn.query_row(
        "INSERT INTO budgets (user_id, month, category, amount_cents)
         VALUES (?, ?, ?, ?)
         ON CONFLICT(user_id, month, category) DO UPDATE SET
             amount_cents = excluded.amount_cents,
             updated_at = datetime('now')
         RETURNING id",
        params![user_id, budget.month, budget.category, budget.amount_cents],
        |row| row.get(0),
    )?;
    info!(budget_id = id, user_id, month = %budget.month, category = %budget.category, "Upserted budget");
    Ok(id)
}
