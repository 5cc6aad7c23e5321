use rusqlite::{Connection, OptionalExtension, Row, params};
use uuid::Uuid;

use crate::currency;
use crate::current_timestamp;
use crate::db::Database;
use crate::error::{Error, Result};
use crate::ledger;
use crate::types::{Currency, Game, GameMember, Id};
use crate::validation::NewGame;

fn from_row(row: &Row<'_>) -> rusqlite::Result<Game> {
    Ok(Game {
        id: row.get(0)?,
        code: row.get(1)?,
        creator_id: row.get(2)?,
        bet: row.get(3)?,
        winning_points: row.get(4)?,
        join_type: row.get(5)?,
        started_at: row.get(6)?,
        finished_at: row.get(7)?,
        created_at: row.get(8)?,
        currency: currency::from_row(row, 9)?,
        members: Vec::new(),
    })
}

/// Inserts the game row and records the creator as its first member
pub fn insert(conn: &Connection, creator_id: Id, currency: &Currency, game: &NewGame) -> Result<Game> {
    let code = Uuid::new_v4().to_string();
    let now = current_timestamp();

    conn.execute(
        "INSERT INTO games
            (code, currency_id, creator_id, bet, winning_points, join_type, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
        params![
            code,
            currency.id,
            creator_id,
            game.bet,
            game.winning_points,
            game.join_type,
            now
        ],
    )?;
    let id = conn.last_insert_rowid();

    conn.execute(
        "INSERT INTO game_user (game_id, user_id, is_winner) VALUES (?1, ?2, 0)",
        params![id, creator_id],
    )?;

    Ok(Game {
        id,
        code,
        creator_id,
        currency: currency.clone(),
        bet: game.bet,
        winning_points: game.winning_points,
        join_type: game.join_type,
        started_at: None,
        finished_at: None,
        created_at: now,
        members: vec![GameMember {
            user_id: creator_id,
            is_winner: false,
        }],
    })
}

pub fn members(conn: &Connection, game_id: Id) -> Result<Vec<GameMember>> {
    let mut stmt = conn.prepare(
        "SELECT user_id, is_winner FROM game_user WHERE game_id = ?1 ORDER BY rowid",
    )?;
    let members = stmt
        .query_map([game_id], |row| {
            Ok(GameMember {
                user_id: row.get(0)?,
                is_winner: row.get(1)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(members)
}

pub fn find_by_code(conn: &Connection, code: &str) -> Result<Option<Game>> {
    let game = conn
        .query_row(
            "SELECT g.id, g.code, g.creator_id, g.bet, g.winning_points, g.join_type,
                    g.started_at, g.finished_at, g.created_at, c.id, c.slug, c.name
             FROM games g
             JOIN currencies c ON c.id = g.currency_id
             WHERE g.code = ?1",
            [code],
            from_row,
        )
        .optional()?;

    match game {
        Some(mut game) => {
            game.members = members(conn, game.id)?;
            Ok(Some(game))
        }
        None => Ok(None),
    }
}

pub fn count(conn: &Connection) -> Result<u64> {
    Ok(conn.query_row("SELECT COUNT(*) FROM games", [], |row| row.get(0))?)
}

/// Creates wagered games on behalf of authenticated users
#[derive(Clone)]
pub struct GameService {
    db: Database,
}

impl GameService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Checks the creator's balance in the requested currency covers the bet and
    /// records the game. The check and the insert share one write transaction, so
    /// concurrent requests cannot both pass against the same balance.
    ///
    /// The bet is not deducted here.
    pub fn create_game(&self, user_id: Id, game: &NewGame) -> Result<Game> {
        let created = self.db.transaction(|tx| {
            let currency =
                currency::find_by_id(tx, game.currency_id)?.ok_or(Error::NotFound("currency"))?;

            let balance =
                ledger::find(tx, user_id, currency.id)?.ok_or(Error::NotFound("balance"))?;

            if balance.amount < game.bet {
                return Err(Error::InsufficientFunds {
                    available: balance.amount,
                    requested: game.bet,
                });
            }

            insert(tx, user_id, &currency, game)
        })?;

        tracing::info!(
            "User {} created game {} ({} {} to {} points, {})",
            user_id,
            created.code,
            created.bet,
            created.currency.slug,
            created.winning_points,
            created.join_type
        );
        Ok(created)
    }

    pub fn find_by_code(&self, code: &str) -> Result<Game> {
        self.db
            .read(|conn| find_by_code(conn, code))?
            .ok_or(Error::NotFound("game"))
    }
}
