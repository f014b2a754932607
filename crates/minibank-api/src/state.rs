//! Application state

use metrics_exporter_prometheus::PrometheusHandle;
use minibank_auth::{AccessGuard, AuthFlow, TokenService};
use minibank_db::AccountStore;
use std::sync::Arc;

/// Handle used to render collected metrics
pub type MetricsHandle = PrometheusHandle;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn AccountStore>,
    pub tokens: Arc<TokenService>,
    pub auth: Arc<AuthFlow>,
    pub guard: AccessGuard,
}

impl AppState {
    pub fn new(
        store: Arc<dyn AccountStore>,
        tokens: Arc<TokenService>,
        auth: Arc<AuthFlow>,
    ) -> Self {
        let guard = AccessGuard::new(tokens.clone(), store.clone());
        Self {
            store,
            tokens,
            auth,
            guard,
        }
    }
}
