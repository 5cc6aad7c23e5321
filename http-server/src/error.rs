use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

// Everything a handler can fail with, rendered as `{"message": ...}`
#[derive(Debug)]
pub enum ApiError {
    Domain(tavern::Error),
    BadBody(String),
    Internal(String),
}

impl From<tavern::Error> for ApiError {
    fn from(err: tavern::Error) -> Self {
        ApiError::Domain(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadBody(rejection.body_text())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        use tavern::Error::*;
        match self {
            ApiError::Domain(err) => match err {
                Validation { .. } | InvalidCredentials | UserExists | InsufficientFunds { .. } => {
                    StatusCode::BAD_REQUEST
                }
                Unauthorized => StatusCode::UNAUTHORIZED,
                NotFound(_) => StatusCode::NOT_FOUND,
                Database(_) | PasswordHash(_) | Token(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::BadBody(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::Domain(tavern::Error::Validation { field, message }) => {
                json!({ "field": field, "message": message })
            }
            ApiError::Domain(err) if err.is_internal() => {
                tracing::error!("Request failed: {}", err);
                json!({ "message": "Internal Server Error" })
            }
            ApiError::Domain(err) => json!({ "message": err.to_string() }),
            ApiError::BadBody(message) => json!({ "message": message }),
            ApiError::Internal(message) => {
                tracing::error!("Request failed: {}", message);
                json!({ "message": "Internal Server Error" })
            }
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tavern::Error;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (Error::validation("bet", "bet is required"), StatusCode::BAD_REQUEST),
            (Error::InvalidCredentials, StatusCode::BAD_REQUEST),
            (Error::UserExists, StatusCode::BAD_REQUEST),
            (
                Error::InsufficientFunds {
                    available: 1,
                    requested: 2,
                },
                StatusCode::BAD_REQUEST,
            ),
            (Error::Unauthorized, StatusCode::UNAUTHORIZED),
            (Error::NotFound("currency"), StatusCode::NOT_FOUND),
            (
                Error::PasswordHash("boom".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }
}
