use crate::models::user::{NewUser, User};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{info, trace};

fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        password_hash: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

pub fn get_user(conn: &Connection, id: i64) -> rusqlite::Result<Option<User>> {
    trace!(user_id = id, "Fetching user");
    conn.query_row(
        "SELECT id, email, password_hash, created_at, updated_at FROM users WHERE id = ?",
        [id],
        row_to_user,
    )
    .optional()
}

pub fn find_by_email(conn: &Connection, email: &str) -> rusqlite::Result<Option<User>> {
    conn.query_row(
        "SELECT id, email, password_hash, created_at, updated_at FROM users WHERE email = ?",
        [email],
        row_to_user,
    )
    .optional()
}

pub fn create_user(conn: &Connection, user: &NewUser) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO users (email, password_hash) VALUES (?, ?)",
        params![user.email, user.password_hash],
    )?;
    let id = conn.last_insert_rowid();
    info!(user_id = id, email = %user.email, "Created user");
    Ok(id)
}

/// Make sure the user that single-user mode acts on exists.
pub fn ensure_user(conn: &Connection, id: i64, email: &str) -> rusqlite::Result<()> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO users (id, email) VALUES (?, ?)",
        params![id, email],
    )?;
    if inserted > 0 {
        info!(user_id = id, email, "Created default user");
    }
    Ok(())
}
