//! Authentication error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use minibank_db::DbError;
use serde_json::json;
use std::fmt;
use thiserror::Error;

/// Message returned for every failed login
pub const LOGIN_FAILED_MESSAGE: &str = "unable to authenticate";
/// Message returned for every denied account access
pub const PERMISSION_DENIED_MESSAGE: &str = "permission denied";

/// Why the access guard refused a request (logged, never returned)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    MissingToken,
    InvalidToken,
    MalformedId,
    AccountUnavailable,
    ClaimMismatch,
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            DenyReason::MissingToken => "missing token",
            DenyReason::InvalidToken => "invalid token",
            DenyReason::MalformedId => "malformed account id",
            DenyReason::AccountUnavailable => "account unavailable",
            DenyReason::ClaimMismatch => "account number mismatch",
        };
        f.write_str(reason)
    }
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Permission denied: {0}")]
    PermissionDenied(DenyReason),

    #[error("Signing secret is not configured")]
    MissingSecret,

    #[error("Token signing error: {0}")]
    Signing(String),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Persistence error: {0}")]
    Persistence(#[from] DbError),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AuthError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, LOGIN_FAILED_MESSAGE.to_string())
            }
            AuthError::InvalidToken | AuthError::TokenExpired | AuthError::PermissionDenied(_) => {
                (StatusCode::FORBIDDEN, PERMISSION_DENIED_MESSAGE.to_string())
            }
            AuthError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AuthError::Persistence(DbError::Duplicate(msg)) => (StatusCode::CONFLICT, msg.clone()),
            AuthError::MissingSecret
            | AuthError::Signing(_)
            | AuthError::PasswordHash(_)
            | AuthError::Persistence(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal error".to_string(),
            ),
        };

        let body = axum::Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
