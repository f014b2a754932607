//! Liveness and store reachability

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde::Serialize;
use tracing::warn;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub store: &'static str,
    pub version: &'static str,
}

/// 200 while the account store answers, 503 otherwise
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    metrics::counter!("minibank_health_checks_total").increment(1);

    let (code, status, store) = match state.store.ping().await {
        Ok(()) => (StatusCode::OK, "healthy", "reachable"),
        Err(e) => {
            warn!("Account store unreachable: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "unhealthy", "unreachable")
        }
    };

    let body = HealthResponse {
        status,
        store,
        version: env!("CARGO_PKG_VERSION"),
    };
    (code, Json(body))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
}
