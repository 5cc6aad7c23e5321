//! Per-user, per-currency balances. Amounts never go below zero: debits are
//! conditional updates and the table carries a CHECK constraint as a backstop.

use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::currency;
use crate::current_timestamp;
use crate::error::{Error, Result};
use crate::types::{Balance, Id};

const SELECT_BALANCE: &str = "
    SELECT b.id, b.user_id, b.amount, c.id, c.slug, c.name
    FROM balances b
    JOIN currencies c ON c.id = b.currency_id";

fn from_row(row: &Row<'_>) -> rusqlite::Result<Balance> {
    Ok(Balance {
        id: row.get(0)?,
        user_id: row.get(1)?,
        amount: row.get(2)?,
        currency: currency::from_row(row, 3)?,
    })
}

/// Creates the (user, currency) balance row. Fails if one already exists.
pub fn open(conn: &Connection, user_id: Id, currency_id: Id, amount: u64) -> Result<Balance> {
    let now = current_timestamp();
    conn.execute(
        "INSERT INTO balances (user_id, currency_id, amount, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?4)",
        params![user_id, currency_id, amount, now],
    )?;
    find(conn, user_id, currency_id)?.ok_or(Error::NotFound("balance"))
}

pub fn find(conn: &Connection, user_id: Id, currency_id: Id) -> Result<Option<Balance>> {
    Ok(conn
        .query_row(
            &format!("{SELECT_BALANCE} WHERE b.user_id = ?1 AND b.currency_id = ?2"),
            params![user_id, currency_id],
            from_row,
        )
        .optional()?)
}

pub fn find_by_slug(conn: &Connection, user_id: Id, slug: &str) -> Result<Option<Balance>> {
    Ok(conn
        .query_row(
            &format!("{SELECT_BALANCE} WHERE b.user_id = ?1 AND c.slug = ?2"),
            params![user_id, slug],
            from_row,
        )
        .optional()?)
}

pub fn list_for_user(conn: &Connection, user_id: Id) -> Result<Vec<Balance>> {
    let mut stmt = conn.prepare(&format!(
        "{SELECT_BALANCE} WHERE b.user_id = ?1 ORDER BY c.id"
    ))?;
    let balances = stmt
        .query_map([user_id], from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(balances)
}

pub fn credit(conn: &Connection, user_id: Id, currency_id: Id, amount: u64) -> Result<Balance> {
    let changed = conn.execute(
        "UPDATE balances SET amount = amount + ?1, updated_at = ?2
         WHERE user_id = ?3 AND currency_id = ?4",
        params![amount, current_timestamp(), user_id, currency_id],
    )?;
    if changed == 0 {
        return Err(Error::NotFound("balance"));
    }
    find(conn, user_id, currency_id)?.ok_or(Error::NotFound("balance"))
}

/// Subtracts `amount` only if the balance covers it
pub fn debit(conn: &Connection, user_id: Id, currency_id: Id, amount: u64) -> Result<Balance> {
    let changed = conn.execute(
        "UPDATE balances SET amount = amount - ?1, updated_at = ?2
         WHERE user_id = ?3 AND currency_id = ?4 AND amount >= ?1",
        params![amount, current_timestamp(), user_id, currency_id],
    )?;
    if changed == 0 {
        let balance = find(conn, user_id, currency_id)?.ok_or(Error::NotFound("balance"))?;
        return Err(Error::InsufficientFunds {
            available: balance.amount,
            requested: amount,
        });
    }
    find(conn, user_id, currency_id)?.ok_or(Error::NotFound("balance"))
}
