//! Prometheus exposition

use axum::{
    Router,
    extract::State,
    http::header::CONTENT_TYPE,
    response::IntoResponse,
    routing::get,
};
use std::sync::Arc;

use crate::state::MetricsHandle;

const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// GET /metrics in the Prometheus text format
async fn scrape(State(handle): State<Arc<MetricsHandle>>) -> impl IntoResponse {
    ([(CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)], handle.render())
}

/// Mounted only when a recorder is installed
pub fn routes(handle: Arc<MetricsHandle>) -> Router {
    Router::new().route("/metrics", get(scrape)).with_state(handle)
}
