//! MiniBank REST API
//!
//! This crate provides the Axum-based HTTP API for MiniBank: login,
//! account management, health and metrics endpoints.

pub mod error;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::{AppState, MetricsHandle};
