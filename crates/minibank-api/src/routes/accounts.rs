//! Account routes

use axum::{
    Extension, Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::get,
};
use minibank_auth::{AccessGuard, AuthError, AuthorizedAccount, NewAccountRequest, account_guard};
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

use super::types::{AccountResponse, DeletedResponse};

/// GET /account
async fn list_accounts(
    State(state): State<AppState>,
) -> Result<Json<Vec<AccountResponse>>, ApiError> {
    let accounts = state.store.get_accounts().await?;

    Ok(Json(accounts.into_iter().map(AccountResponse::from).collect()))
}

/// POST /account
async fn create_account(
    State(state): State<AppState>,
    body: Result<Json<NewAccountRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AccountResponse>), ApiError> {
    let Json(request) =
        body.map_err(|rejection| AuthError::InvalidInput(rejection.body_text()))?;
    let account = state.auth.create_account(request).await?;

    metrics::counter!("minibank_accounts_created_total").increment(1);

    Ok((StatusCode::CREATED, Json(account.into())))
}

/// GET /account/{id} (owner only)
async fn get_account(
    Extension(AuthorizedAccount(account)): Extension<AuthorizedAccount>,
) -> Json<AccountResponse> {
    Json(account.into())
}

/// DELETE /account/{id} (owner only)
async fn delete_account(
    State(state): State<AppState>,
    Extension(AuthorizedAccount(account)): Extension<AuthorizedAccount>,
) -> Result<Json<DeletedResponse>, ApiError> {
    state.store.delete_account(account.id).await?;

    info!("Deleted account {} (id {})", account.username, account.id);

    Ok(Json(DeletedResponse { deleted: account.id }))
}

/// Create account routes; `/account/{id}` sits behind the account guard
pub fn routes(guard: AccessGuard) -> Router<AppState> {
    let owned = Router::new()
        .route("/account/{id}", get(get_account).delete(delete_account))
        .route_layer(from_fn_with_state(guard, account_guard));

    Router::new()
        .route("/account", get(list_accounts).post(create_account))
        .merge(owned)
}
