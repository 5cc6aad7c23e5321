use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or out-of-range input, reported against a single field
    #[error("{message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("User already exists")]
    UserExists,

    /// Missing, malformed, expired or orphaned bearer token
    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("insufficient funds: balance {available}, bet {requested}")]
    InsufficientFunds { available: u64, requested: u64 },

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("password hashing failed: {0}")]
    PasswordHash(String),

    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

impl Error {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Error::Validation {
            field,
            message: message.into(),
        }
    }

    /// True for failures caused by the server rather than the caller
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Error::Database(_) | Error::PasswordHash(_) | Error::Token(_)
        )
    }
}

impl From<argon2::password_hash::Error> for Error {
    fn from(err: argon2::password_hash::Error) -> Self {
        Error::PasswordHash(err.to_string())
    }
}

impl From<argon2::Error> for Error {
    fn from(err: argon2::Error) -> Self {
        Error::PasswordHash(err.to_string())
    }
}
