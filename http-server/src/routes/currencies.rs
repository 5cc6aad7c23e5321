use axum::{Json, extract::State};
use tavern::currency;
use tavern::types::Currency;

use super::{DataResponse, run_blocking};
use crate::{AppState, error::ApiError};

pub async fn get_currencies(
    State(state): State<AppState>,
) -> Result<Json<DataResponse<Vec<Currency>>>, ApiError> {
    let db = state.db.clone();
    let currencies = run_blocking(move || db.read(currency::list)).await?;
    Ok(Json(DataResponse::new(currencies)))
}
