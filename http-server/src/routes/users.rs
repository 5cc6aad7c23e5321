use axum::{Json, extract::State, extract::rejection::JsonRejection};
use serde::Serialize;
use tavern::types::{Currency, Id};
use tavern::validation::Credentials;

use super::{DataResponse, run_blocking};
use crate::{AppState, error::ApiError, middleware::AuthUser};

// Login/registration response
#[derive(Serialize)]
pub struct TokenResponse {
    pub message: String,
    pub token: String,
}

// Register endpoint
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Json(credentials) = payload?;
    let auth = state.auth.clone();
    let token = run_blocking(move || auth.register(&credentials)).await?;

    Ok(Json(TokenResponse {
        message: "Success registration".to_string(),
        token,
    }))
}

// Login endpoint
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Json(credentials) = payload?;
    let auth = state.auth.clone();
    let username = credentials.username.clone();

    let token = run_blocking(move || auth.login(&credentials))
        .await
        .inspect_err(|_| tracing::warn!("Failed login for {}", username))?;

    Ok(Json(TokenResponse {
        message: "Logged in".to_string(),
        token,
    }))
}

#[derive(Serialize)]
pub struct BalanceResponse {
    pub amount: u64,
    pub currency: Currency,
}

// User profile response
#[derive(Serialize)]
pub struct ProfileResponse {
    pub id: Id,
    pub username: String,
    pub balance: Option<BalanceResponse>,
}

// Get user profile endpoint (protected route)
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<DataResponse<ProfileResponse>>, ApiError> {
    let auth = state.auth.clone();
    let profile = run_blocking(move || auth.profile(user.id)).await?;

    Ok(Json(DataResponse::new(ProfileResponse {
        id: profile.user.id,
        username: profile.user.username,
        balance: profile.balance.map(|b| BalanceResponse {
            amount: b.amount,
            currency: b.currency,
        }),
    })))
}
