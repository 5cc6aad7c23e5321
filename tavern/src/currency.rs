use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::current_timestamp;
use crate::error::Result;
use crate::types::{Currency, Id};

pub const BRONZE: &str = "bronze";
pub const SILVER: &str = "silver";
pub const GOLD: &str = "gold";

/// Currencies present after every startup, as (slug, display name)
pub const SEED: [(&str, &str); 3] = [(BRONZE, "Bronze"), (SILVER, "Silver"), (GOLD, "Gold")];

pub(crate) fn from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Currency> {
    Ok(Currency {
        id: row.get(offset)?,
        slug: row.get(offset + 1)?,
        name: row.get(offset + 2)?,
    })
}

/// Upserts the seed currencies keyed on slug
pub fn seed(conn: &Connection) -> Result<()> {
    let now = current_timestamp();
    let mut stmt = conn.prepare(
        "INSERT INTO currencies (slug, name, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?3)
         ON CONFLICT (slug) DO UPDATE SET name = excluded.name, updated_at = excluded.updated_at",
    )?;
    for (slug, name) in SEED {
        stmt.execute(params![slug, name, now])?;
    }
    Ok(())
}

pub fn list(conn: &Connection) -> Result<Vec<Currency>> {
    let mut stmt = conn.prepare("SELECT id, slug, name FROM currencies ORDER BY id")?;
    let currencies = stmt
        .query_map([], |row| from_row(row, 0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(currencies)
}

pub fn find_by_id(conn: &Connection, id: Id) -> Result<Option<Currency>> {
    Ok(conn
        .query_row(
            "SELECT id, slug, name FROM currencies WHERE id = ?1",
            [id],
            |row| from_row(row, 0),
        )
        .optional()?)
}

pub fn find_by_slug(conn: &Connection, slug: &str) -> Result<Option<Currency>> {
    Ok(conn
        .query_row(
            "SELECT id, slug, name FROM currencies WHERE slug = ?1",
            [slug],
            |row| from_row(row, 0),
        )
        .optional()?)
}
