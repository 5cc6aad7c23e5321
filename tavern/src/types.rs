use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Row identifier shared by every table
pub type Id = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    pub id: Id,
    pub slug: String,
    pub name: String,
}

/// Amount of one currency owned by one user, with the currency resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Balance {
    pub id: Id,
    pub user_id: Id,
    pub amount: u64,
    pub currency: Currency,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Id,
    pub username: String,
    /// PHC-formatted argon2 hash, never serialized
    pub password_hash: String,
}

/// Who may join a game
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinType {
    /// Open to any player
    Anyone,
    /// Restricted to the creator's friends
    Friends,
    /// Only players holding the invite link
    Link,
}

impl JoinType {
    pub const ALL: [JoinType; 3] = [JoinType::Anyone, JoinType::Friends, JoinType::Link];

    pub fn as_str(&self) -> &'static str {
        match self {
            JoinType::Anyone => "anyone",
            JoinType::Friends => "friends",
            JoinType::Link => "link",
        }
    }
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownJoinType(pub String);

impl fmt::Display for UnknownJoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid join type {}", self.0)
    }
}

impl std::error::Error for UnknownJoinType {}

impl FromStr for JoinType {
    type Err = UnknownJoinType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JoinType::ALL
            .into_iter()
            .find(|join_type| join_type.as_str() == s)
            .ok_or_else(|| UnknownJoinType(s.to_string()))
    }
}

impl ToSql for JoinType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for JoinType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct GameMember {
    pub user_id: Id,
    pub is_winner: bool,
}

/// A wagered game session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Game {
    pub id: Id,
    /// Unique join code used to share the game
    pub code: String,
    pub creator_id: Id,
    pub currency: Currency,
    pub bet: u64,
    pub winning_points: u64,
    pub join_type: JoinType,
    /// Unix seconds; unset until play begins
    pub started_at: Option<i64>,
    pub finished_at: Option<i64>,
    pub created_at: i64,
    pub members: Vec<GameMember>,
}
