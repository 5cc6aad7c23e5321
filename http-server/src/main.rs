use axum::{
    Router,
    http::StatusCode,
    routing::{get, post},
};
use clap::Parser;
use std::sync::Arc;
use tavern::Database;
use tavern::auth::{AuthService, Passwords, Tokens};
use tavern::games::GameService;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod middleware;
mod routes;

use config::Config;
use routes::currencies::get_currencies;
use routes::games::{create_game, get_game};
use routes::users::{get_profile, login, register};

// Application state shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub auth: Arc<AuthService>,
    pub games: Arc<GameService>,
}

impl AppState {
    pub fn new(db: Database, passwords: Passwords, tokens: Tokens, starting_balance: u64) -> Self {
        Self {
            auth: Arc::new(AuthService::new(
                db.clone(),
                passwords,
                tokens,
                starting_balance,
            )),
            games: Arc::new(GameService::new(db.clone())),
            db,
        }
    }
}

pub fn app(state: AppState, cors: CorsLayer) -> Router {
    let api = Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/profile", get(get_profile))
        .route("/games", post(create_game))
        .route("/games/{code}", get(get_game))
        .route("/currencies", get(get_currencies))
        .layer(TraceLayer::new_for_http());

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/api", api)
        .fallback(not_found)
        .layer(ServiceBuilder::new().layer(cors))
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();

    let db = config.open_database()?;
    tracing::info!("Database ready at {}", config.database.display());

    let passwords = Passwords::new(config.hash_cost())?;
    let tokens = Tokens::new(config.jwt_secret.as_bytes());
    let state = AppState::new(db, passwords, tokens, config.starting_balance);

    let app = app(state, config.cors()?);

    let addr = config.addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Server running on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

// Root endpoint
async fn root() -> &'static str {
    "Tavern Dice API - POST /api/register or /api/login for a token, POST /api/games to open a wagered game"
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}
