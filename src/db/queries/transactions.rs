use crate::date_utils::DateRange;
use crate::models::transaction::{NewTransaction, Transaction, TransactionType};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info, trace, warn};

const SELECT_COLUMNS: &str =
    "SELECT id, user_id, date, amount_cents, category, description, type, created_at, updated_at
     FROM transactions";

fn row_to_transaction(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    let kind: String = row.get(6)?;
    Ok(Transaction {
        id: row.get(0)?,
        user_id: row.get(1)?,
        date: row.get(2)?,
        amount_cents: row.get(3)?,
        category: row.get(4)?,
        description: row.get(5)?,
        kind: TransactionType::parse(&kind).unwrap_or_default(),
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

#[derive(Debug, Default)]
pub struct TransactionFilter {
    pub kind: Option<TransactionType>,
    pub category: Option<String>,
    /// Inclusive lower bound.
    pub from_date: Option<NaiveDate>,
    /// Inclusive upper bound.
    pub to_date: Option<NaiveDate>,
    /// Exclusive upper bound.
    pub before_date: Option<NaiveDate>,
}

/// All of a user's transactions dated within `range` (inclusive), ordered by
/// date then id.
pub fn list_in_range(
    conn: &Connection,
    user_id: i64,
    range: &DateRange,
) -> rusqlite::Result<Vec<Transaction>> {
    list_transactions(
        conn,
        user_id,
        &TransactionFilter {
            from_date: Some(range.start),
            to_date: Some(range.end),
            ..Default::default()
        },
    )
}

pub fn list_transactions(
    conn: &Connection,
    user_id: i64,
    filter: &TransactionFilter,
) -> rusqlite::Result<Vec<Transaction>> {
    let mut sql = format!("{} WHERE user_id = ?", SELECT_COLUMNS);
    let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(user_id)];

    if let Some(kind) = filter.kind {
        sql.push_str(" AND type = ?");
        params_vec.push(Box::new(kind.as_str()));
    }
    if let Some(ref category) = filter.category {
        sql.push_str(" AND category = ?");
        params_vec.push(Box::new(category.clone()));
    }
    if let Some(from_date) = filter.from_date {
        sql.push_str(" AND date >= ?");
        params_vec.push(Box::new(from_date));
    }
    if let Some(to_date) = filter.to_date {
        sql.push_str(" AND date <= ?");
        params_vec.push(Box::new(to_date));
    }
    if let Some(before_date) = filter.before_date {
        sql.push_str(" AND date < ?");
        params_vec.push(Box::new(before_date));
    }
    sql.push_str(" ORDER BY date ASC, id ASC");

    let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
    let mut stmt = conn.prepare(&sql)?;
    let transactions = stmt
        .query_map(params_refs.as_slice(), row_to_transaction)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    debug!(user_id, count = transactions.len(), "Listed transactions");
    Ok(transactions)
}

pub fn get_transaction(conn: &Connection, id: i64) -> rusqlite::Result<Option<Transaction>> {
    trace!(transaction_id = id, "Fetching transaction");
    conn.query_row(
        &format!("{} WHERE id = ?", SELECT_COLUMNS),
        [id],
        row_to_transaction,
    )
    .optional()
}

pub fn create_transaction(
    conn: &Connection,
    user_id: i64,
    transaction: &NewTransaction,
) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO transactions (user_id, date, amount_cents, category, description, type)
         VALUES (?, ?, ?, ?, ?, ?)",
        params![
            user_id,
            transaction.date,
            transaction.amount_cents,
            transaction.category,
            transaction.description,
            transaction.kind.as_str(),
        ],
    )?;
    let id = conn.last_insert_rowid();
    debug!(transaction_id = id, user_id, "Created transaction");
    Ok(id)
}

pub fn update_transaction(
    conn: &Connection,
    id: i64,
    transaction: &NewTransaction,
) -> rusqlite::Result<bool> {
    let rows = conn.execute(
        "UPDATE transactions
         SET date = ?, amount_cents = ?, category = ?, description = ?, type = ?,
             updated_at = datetime('now')
         WHERE id = ?",
        params![
            transaction.date,
            transaction.amount_cents,
            transaction.category,
            transaction.description,
            transaction.kind.as_str(),
            id,
        ],
    )?;
    if rows > 0 {
        info!(transaction_id = id, "Updated transaction");
    }
    Ok(rows > 0)
}

pub fn delete_transaction(conn: &Connection, id: i64) -> rusqlite::Result<bool> {
    let rows = conn.execute("DELETE FROM transactions WHERE id = ?", [id])?;
    if rows > 0 {
        info!(transaction_id = id, "Deleted transaction");
    }
    Ok(rows > 0)
}

pub fn delete_all_for_user(conn: &Connection, user_id: i64) -> rusqlite::Result<usize> {
    let rows = conn.execute("DELETE FROM transactions WHERE user_id = ?", [user_id])?;
    warn!(user_id, count = rows, "Deleted all transactions for user");
    Ok(rows)
}

pub fn count_for_user(conn: &Connection, user_id: i64) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM transactions WHERE user_id = ?",
        [user_id],
        |row| row.get(0),
    )
}

/// Signed sum of `expense`-typed amounts per category for dates in
/// `[start, end_exclusive)`, ordered by category.
pub fn expense_sums_by_category(
    conn: &Connection,
    user_id: i64,
    start: NaiveDate,
    end_exclusive: NaiveDate,
) -> rusqlite::Result<Vec<(String, i64)>> {
    let mut stmt = conn.prepare(
        "SELECT category, COALESCE(SUM(amount_cents), 0)
         FROM transactions
         WHERE user_id = ? AND type = 'expense' AND date >= ? AND date < ?
         GROUP BY category
         ORDER BY category",
    )?;

    let sums = stmt
        .query_map(params![user_id, start, end_exclusive], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    debug!(user_id, categories = sums.len(), "Summed expenses by category");
    Ok(sums)
}
