use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::current_timestamp;
use crate::error::Result;
use crate::types::{Id, User};

fn from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
    })
}

pub fn insert(conn: &Connection, username: &str, password_hash: &str) -> Result<User> {
    let now = current_timestamp();
    conn.execute(
        "INSERT INTO users (username, password, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
        params![username, password_hash, now],
    )?;
    Ok(User {
        id: conn.last_insert_rowid(),
        username: username.to_string(),
        password_hash: password_hash.to_string(),
    })
}

pub fn find_by_id(conn: &Connection, id: Id) -> Result<Option<User>> {
    Ok(conn
        .query_row(
            "SELECT id, username, password FROM users WHERE id = ?1",
            [id],
            from_row,
        )
        .optional()?)
}

pub fn find_by_username(conn: &Connection, username: &str) -> Result<Option<User>> {
    Ok(conn
        .query_row(
            "SELECT id, username, password FROM users WHERE username = ?1",
            [username],
            from_row,
        )
        .optional()?)
}

pub fn count(conn: &Connection) -> Result<u64> {
    Ok(conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?)
}
