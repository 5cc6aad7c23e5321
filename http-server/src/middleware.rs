use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tavern::auth::Claims;
use tavern::types::User;

use crate::{AppState, error::ApiError, routes::run_blocking};

fn bearer_token(parts: &Parts) -> Result<&str, ApiError> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            tracing::debug!("Request without a bearer token");
            ApiError::from(tavern::Error::Unauthorized)
        })
}

// Axum extractor for a verified token. Only checks signature and expiry, so it never
// touches the database; the handler decides when to load the user.
#[derive(Debug, Clone)]
pub struct BearerClaims(pub Claims);

impl FromRequestParts<AppState> for BearerClaims {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        Ok(BearerClaims(state.auth.verify_token(token)?))
    }
}

// Axum extractor for authenticated users
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let BearerClaims(claims) = BearerClaims::from_request_parts(parts, state).await?;

        let auth = state.auth.clone();
        let user = run_blocking(move || auth.user_for(&claims)).await?;
        Ok(AuthUser(user))
    }
}
