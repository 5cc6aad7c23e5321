use anyhow::Context;
use axum::http::{HeaderValue, Method, header};
use clap::Parser;
use clap::builder::NonEmptyStringValueParser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tavern::Database;
use tavern::auth::{DEFAULT_STARTING_BALANCE, HashCost};
use tower_http::cors::CorsLayer;

// Server configuration, from flags or the environment
#[derive(Debug, Clone, Parser)]
#[command(name = "tavern-server", about = "Tavern Dice game backend")]
pub struct Config {
    #[arg(long, env = "APP_HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "APP_PORT", default_value_t = 3000)]
    pub port: u16,

    /// SQLite file, or `:memory:`
    #[arg(long, env = "DB_PATH", default_value = "tavern.db")]
    pub database: PathBuf,

    #[arg(
        long,
        env = "JWT_SECRET",
        hide_env_values = true,
        value_parser = NonEmptyStringValueParser::new()
    )]
    pub jwt_secret: String,

    /// Allowed CORS origins; permissive when none are given
    #[arg(long = "cors-origin", env = "CORS_ORIGIN", value_delimiter = ',')]
    pub cors_origins: Vec<String>,

    /// Bronze granted to every new user
    #[arg(long, env = "STARTING_BALANCE", default_value_t = DEFAULT_STARTING_BALANCE)]
    pub starting_balance: u64,

    #[arg(long, env = "HASH_MEMORY_KIB", default_value_t = HashCost::default().memory_kib)]
    pub hash_memory_kib: u32,

    #[arg(long, env = "HASH_ITERATIONS", default_value_t = HashCost::default().iterations)]
    pub hash_iterations: u32,

    #[arg(long, env = "HASH_PARALLELISM", default_value_t = HashCost::default().parallelism)]
    pub hash_parallelism: u32,
}

impl Config {
    pub fn addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }

    pub fn hash_cost(&self) -> HashCost {
        HashCost {
            memory_kib: self.hash_memory_kib,
            iterations: self.hash_iterations,
            parallelism: self.hash_parallelism,
        }
    }

    pub fn open_database(&self) -> anyhow::Result<Database> {
        let db = if self.database.as_os_str() == ":memory:" {
            Database::open_in_memory()
        } else {
            Database::open(&self.database)
        };
        db.with_context(|| format!("failed to open database {}", self.database.display()))
    }

    pub fn cors(&self) -> anyhow::Result<CorsLayer> {
        if self.cors_origins.is_empty() {
            return Ok(CorsLayer::permissive());
        }

        let origins = self
            .cors_origins
            .iter()
            .map(|origin| {
                HeaderValue::from_str(origin)
                    .with_context(|| format!("invalid CORS origin {origin}"))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]))
    }
}
