//! Domain core of the Tavern Dice backend: currencies, balances, users, tokens and
//! wagered game creation on top of SQLite.

pub mod auth;
pub mod currency;
pub mod db;
pub mod error;
pub mod games;
pub mod ledger;
pub mod types;
pub mod users;
pub mod validation;

use std::time::{SystemTime, UNIX_EPOCH};

pub use db::Database;
pub use error::{Error, Result};

/// Unix seconds
#[inline(always)]
pub(crate) fn current_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_secs() as i64
}
