//! Login route

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::post,
};
use minibank_auth::AuthError;
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

use super::types::{LoginRequest, LoginResponse};

/// POST /login
///
/// An unreadable body fails exactly like a wrong password.
async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let result = match body {
        Ok(Json(request)) => state.auth.login(&request.username, &request.password).await,
        Err(rejection) => {
            debug!("Login body rejected: {}", rejection.body_text());
            Err(AuthError::InvalidCredentials)
        }
    };

    let outcome = match &result {
        Ok(_) => "success",
        Err(AuthError::InvalidCredentials) => "rejected",
        Err(_) => "error",
    };
    metrics::counter!("minibank_logins_total", "outcome" => outcome).increment(1);

    let login = result?;

    Ok(Json(LoginResponse {
        token: login.token,
        username: login.username,
        expires_in: state.tokens.token_ttl().num_seconds(),
    }))
}

/// Create auth routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/login", post(login))
}
