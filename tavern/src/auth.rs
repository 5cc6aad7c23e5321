//! Registration, login and bearer tokens.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::currency::{self, BRONZE};
use crate::current_timestamp;
use crate::db::Database;
use crate::error::{Error, Result};
use crate::ledger;
use crate::types::{Balance, Id, User};
use crate::users;
use crate::validation::Credentials;

pub const TOKEN_TTL: Duration = Duration::from_secs(72 * 60 * 60);
pub const DEFAULT_STARTING_BALANCE: u64 = 1_000;

/// Argon2id cost parameters
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct HashCost {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashCost {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

/// Password hashing and verification.
///
/// Holds a hash of a random throwaway password made with the same parameters as
/// real hashes, so a login for an unknown username can pay the same verification
/// cost as a wrong password.
#[derive(Clone)]
pub struct Passwords {
    argon2: Argon2<'static>,
    dummy_hash: String,
}

impl Passwords {
    pub fn new(cost: HashCost) -> Result<Self> {
        let params = Params::new(cost.memory_kib, cost.iterations, cost.parallelism, None)?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let mut throwaway = [0u8; 32];
        OsRng.fill_bytes(&mut throwaway);
        let salt = SaltString::generate(&mut OsRng);
        let dummy_hash = argon2.hash_password(&throwaway, &salt)?.to_string();

        Ok(Self { argon2, dummy_hash })
    }

    pub fn hash(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        Ok(self
            .argon2
            .hash_password(password.as_bytes(), &salt)?
            .to_string())
    }

    pub fn verify(&self, hash: &str, password: &str) -> bool {
        match PasswordHash::new(hash) {
            Ok(parsed) => self
                .argon2
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                tracing::warn!("Stored password hash could not be parsed: {}", e);
                false
            }
        }
    }

    /// Burns one verification against the throwaway hash. Always false.
    pub fn verify_dummy(&self, password: &str) -> bool {
        self.verify(&self.dummy_hash, password)
    }
}

/// Verified token payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: Id,
    /// Expiry, unix seconds
    pub exp: u64,
}

/// HS256 token issuer and verifier
#[derive(Clone)]
pub struct Tokens {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl Tokens {
    pub fn new(secret: &[u8]) -> Self {
        Self::with_ttl(secret, TOKEN_TTL)
    }

    pub fn with_ttl(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation: Validation::new(jsonwebtoken::Algorithm::HS256),
            ttl,
        }
    }

    pub fn issue(&self, user_id: Id) -> Result<String> {
        let claims = Claims {
            sub: user_id,
            exp: current_timestamp() as u64 + self.ttl.as_secs(),
        };
        Ok(jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &self.encoding,
        )?)
    }

    /// Decodes and checks signature and expiry. Any failure, including a payload of
    /// the wrong shape, is reported as `Unauthorized`.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("Rejected bearer token: {}", e);
                Error::Unauthorized
            })
    }
}

/// What `GET /profile` shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub user: User,
    /// Balance in the starting currency, if the user holds one
    pub balance: Option<Balance>,
}

#[derive(Clone)]
pub struct AuthService {
    db: Database,
    passwords: Passwords,
    tokens: Tokens,
    starting_balance: u64,
}

impl AuthService {
    pub fn new(db: Database, passwords: Passwords, tokens: Tokens, starting_balance: u64) -> Self {
        Self {
            db,
            passwords,
            tokens,
            starting_balance,
        }
    }

    /// Creates the user with a bronze starting balance and returns a fresh token
    pub fn register(&self, credentials: &Credentials) -> Result<String> {
        credentials.validate()?;

        if self
            .db
            .read(|conn| users::find_by_username(conn, &credentials.username))?
            .is_some()
        {
            return Err(Error::UserExists);
        }

        let hash = self.passwords.hash(&credentials.password)?;

        // Re-checked under the write lock: another registration may have landed
        // while the password was being hashed.
        let user = self.db.transaction(|tx| {
            if users::find_by_username(tx, &credentials.username)?.is_some() {
                return Err(Error::UserExists);
            }
            let user = users::insert(tx, &credentials.username, &hash)?;
            let bronze =
                currency::find_by_slug(tx, BRONZE)?.ok_or(Error::NotFound("currency"))?;
            ledger::open(tx, user.id, bronze.id, self.starting_balance)?;
            Ok(user)
        })?;

        tracing::info!("Registered user {} ({})", user.id, user.username);
        self.tokens.issue(user.id)
    }

    pub fn login(&self, credentials: &Credentials) -> Result<String> {
        credentials.validate()?;

        let user = self
            .db
            .read(|conn| users::find_by_username(conn, &credentials.username))?;

        let Some(user) = user else {
            self.passwords.verify_dummy(&credentials.password);
            return Err(Error::InvalidCredentials);
        };

        if !self.passwords.verify(&user.password_hash, &credentials.password) {
            return Err(Error::InvalidCredentials);
        }

        self.tokens.issue(user.id)
    }

    /// Checks signature and expiry only; no database access
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        self.tokens.verify(token)
    }

    /// Loads the user a verified token speaks for. Tokens for deleted users are rejected.
    pub fn user_for(&self, claims: &Claims) -> Result<User> {
        self.db
            .read(|conn| users::find_by_id(conn, claims.sub))?
            .ok_or(Error::Unauthorized)
    }

    /// Resolves a bearer token to its user
    pub fn authenticate(&self, token: &str) -> Result<User> {
        let claims = self.verify_token(token)?;
        self.user_for(&claims)
    }

    pub fn profile(&self, user_id: Id) -> Result<Profile> {
        self.db.read(|conn| {
            let user = users::find_by_id(conn, user_id)?.ok_or(Error::NotFound("user"))?;
            let balance = ledger::find_by_slug(conn, user_id, BRONZE)?;
            Ok(Profile { user, balance })
        })
    }
}
