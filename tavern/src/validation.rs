//! Static request validation. Everything here runs before any database lookup.

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::types::{Id, JoinType};

pub const WINNING_POINTS_MIN: u64 = 3_000;
pub const WINNING_POINTS_MAX: u64 = 20_000;

pub const USERNAME_MIN_CHARS: usize = 3;
pub const USERNAME_MAX_CHARS: usize = 255;
pub const PASSWORD_MIN_CHARS: usize = 6;
pub const PASSWORD_MAX_CHARS: usize = 50;

/// Game request exactly as the client sent it. Fields stay optional and signed so that
/// missing and negative values produce field-level messages instead of decode failures.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateGameInput {
    pub currency_id: Option<i64>,
    pub bet: Option<i64>,
    pub winning_points: Option<i64>,
    pub join_type: Option<String>,
}

/// A game request that passed static validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGame {
    pub currency_id: Id,
    pub bet: u64,
    pub winning_points: u64,
    pub join_type: JoinType,
}

fn positive(field: &'static str, value: Option<i64>) -> Result<u64> {
    match value {
        None => Err(Error::validation(field, format!("{field} is required"))),
        Some(v) if v <= 0 => Err(Error::validation(
            field,
            format!("{field} must be greater than 0"),
        )),
        Some(v) => Ok(v as u64),
    }
}

impl CreateGameInput {
    pub fn validate(&self) -> Result<NewGame> {
        let currency_id = positive("currency_id", self.currency_id)? as Id;
        let bet = positive("bet", self.bet)?;
        let winning_points = positive("winning_points", self.winning_points)?;

        let join_type = self
            .join_type
            .as_deref()
            .ok_or_else(|| Error::validation("join_type", "join_type is required"))?
            .parse::<JoinType>()
            .map_err(|e| Error::validation("join_type", e.to_string()))?;

        if winning_points > WINNING_POINTS_MAX {
            return Err(Error::validation(
                "winning_points",
                format!("winning points limit exceeded {WINNING_POINTS_MAX} points"),
            ));
        }
        if winning_points < WINNING_POINTS_MIN {
            return Err(Error::validation(
                "winning_points",
                format!("winning points must be at least {WINNING_POINTS_MIN} points"),
            ));
        }

        Ok(NewGame {
            currency_id,
            bet,
            winning_points,
            join_type,
        })
    }
}

/// Username/password pair used by both login and registration
#[derive(Clone, Default, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

// Keep passwords out of logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

fn length_within(field: &'static str, value: &str, min: usize, max: usize) -> Result<()> {
    if value.is_empty() {
        return Err(Error::validation(field, format!("{field} is required")));
    }
    let chars = value.chars().count();
    if chars < min || chars > max {
        return Err(Error::validation(
            field,
            format!("{field} must be between {min} and {max} characters"),
        ));
    }
    Ok(())
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        length_within(
            "username",
            &self.username,
            USERNAME_MIN_CHARS,
            USERNAME_MAX_CHARS,
        )?;
        length_within(
            "password",
            &self.password,
            PASSWORD_MIN_CHARS,
            PASSWORD_MAX_CHARS,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(currency_id: i64, bet: i64, winning_points: i64, join_type: &str) -> CreateGameInput {
        CreateGameInput {
            currency_id: Some(currency_id),
            bet: Some(bet),
            winning_points: Some(winning_points),
            join_type: Some(join_type.to_string()),
        }
    }

    fn field_of(err: Error) -> &'static str {
        match err {
            Error::Validation { field, .. } => field,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_input() {
        let game = input(1, 500, 5000, "anyone").validate().unwrap();
        assert_eq!(
            game,
            NewGame {
                currency_id: 1,
                bet: 500,
                winning_points: 5000,
                join_type: JoinType::Anyone,
            }
        );
    }

    #[test]
    fn test_winning_points_bounds_are_inclusive() {
        assert!(input(1, 1, WINNING_POINTS_MIN as i64, "link").validate().is_ok());
        assert!(input(1, 1, WINNING_POINTS_MAX as i64, "friends").validate().is_ok());

        let err = input(1, 1, 2_999, "anyone").validate().unwrap_err();
        assert_eq!(err.to_string(), "winning points must be at least 3000 points");

        let err = input(1, 1, 20_001, "anyone").validate().unwrap_err();
        assert_eq!(err.to_string(), "winning points limit exceeded 20000 points");
        assert_eq!(field_of(err), "winning_points");
    }

    #[test]
    fn test_unknown_join_type() {
        let err = input(1, 10, 5000, "everyone").validate().unwrap_err();
        assert_eq!(err.to_string(), "invalid join type everyone");
        assert_eq!(field_of(err), "join_type");
    }

    #[test]
    fn test_missing_and_non_positive_fields() {
        let mut missing = input(1, 10, 5000, "anyone");
        missing.bet = None;
        assert_eq!(field_of(missing.validate().unwrap_err()), "bet");

        assert_eq!(
            field_of(input(0, 10, 5000, "anyone").validate().unwrap_err()),
            "currency_id"
        );
        assert_eq!(
            field_of(input(1, -5, 5000, "anyone").validate().unwrap_err()),
            "bet"
        );
        assert_eq!(
            field_of(CreateGameInput::default().validate().unwrap_err()),
            "currency_id"
        );
    }

    #[test]
    fn test_credentials_length_limits() {
        assert!(Credentials::new("bob", "secret").validate().is_ok());
        assert_eq!(
            field_of(Credentials::new("bo", "secret").validate().unwrap_err()),
            "username"
        );
        assert_eq!(
            field_of(Credentials::new("bob", "12345").validate().unwrap_err()),
            "password"
        );
        assert_eq!(
            field_of(Credentials::new("bob", "x".repeat(51)).validate().unwrap_err()),
            "password"
        );
        assert_eq!(
            field_of(Credentials::new("", "secret").validate().unwrap_err()),
            "username"
        );
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let debug = format!("{:?}", Credentials::new("bob", "hunter22"));
        assert!(debug.contains("bob"));
        assert!(!debug.contains("hunter22"));
    }
}
