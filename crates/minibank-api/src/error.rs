//! API error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use minibank_auth::AuthError;
use minibank_db::DbError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            // Login failures and access denials keep their uniform shapes
            ApiError::Auth(e) => {
                if matches!(
                    e,
                    AuthError::PasswordHash(_) | AuthError::Signing(_) | AuthError::Persistence(_)
                ) {
                    error!("Request failed: {}", e);
                }
                return e.into_response();
            }
            ApiError::Database(e) => match e {
                DbError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
                DbError::Duplicate(msg) => (StatusCode::CONFLICT, msg),
                _ => {
                    error!("Database error: {}", e);
                    (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
                }
            },
        };

        let body = axum::Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
