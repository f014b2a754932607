//! MiniBank Database Layer
//!
//! This crate provides the account persistence boundary for MiniBank:
//! the [`AccountStore`] trait, a SQLite implementation via sqlx, and an
//! in-memory implementation used by tests and ephemeral deployments.

pub mod error;
pub mod memory;
pub mod models;
pub mod repository;
pub mod store;
pub mod utils;

pub use error::DbError;
pub use memory::MemoryStore;
pub use models::*;
pub use repository::Database;
pub use store::AccountStore;
