//! MiniBank Authentication and Authorization
//!
//! This crate provides Argon2 password hashing, HMAC-signed bearer tokens,
//! the login and account-creation flow, and the Axum middleware that binds
//! a token to the account named in the request path.

pub mod error;
pub mod flow;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use error::{AuthError, DenyReason};
pub use flow::{AuthFlow, LoginResult, NewAccountRequest};
pub use jwt::{Claims, TokenService};
pub use middleware::{AccessGuard, AuthorizedAccount, TOKEN_HEADER, account_guard};
pub use password::{MAX_PASSWORD_LENGTH, hash_password, verify_password};
