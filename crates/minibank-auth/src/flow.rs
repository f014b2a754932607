//! Login and account creation

use chrono::Utc;
use minibank_db::{Account, AccountStore, DbError, NewAccount};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::AuthError;
use crate::jwt::TokenService;
use crate::password::{hash_password, verify_password};

/// Smallest account number handed out
pub const MIN_ACCOUNT_NUMBER: i64 = 100_000;
/// Largest account number handed out
pub const MAX_ACCOUNT_NUMBER: i64 = 999_999_999;
/// Random draws before giving up on finding a free account number
const MAX_NUMBER_ATTEMPTS: usize = 8;

/// Account creation input
#[derive(Clone, Deserialize)]
pub struct NewAccountRequest {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for NewAccountRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewAccountRequest")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl NewAccountRequest {
    /// All fields must be present; no format rules beyond that
    fn validate(&self) -> Result<(), AuthError> {
        let fields = [
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("username", &self.username),
            ("email", &self.email),
            ("password", &self.password),
        ];

        match fields.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((name, _)) => Err(AuthError::InvalidInput(format!("{} is required", name))),
            None => Ok(()),
        }
    }
}

/// Successful login
#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    pub token: String,
    pub username: String,
}

/// Orchestrates credential checks, token issuance and account creation
pub struct AuthFlow {
    store: Arc<dyn AccountStore>,
    tokens: Arc<TokenService>,
    /// Verified against when the username is unknown, so both failure
    /// paths cost one Argon2 verification
    dummy_hash: String,
}

impl AuthFlow {
    pub fn new(store: Arc<dyn AccountStore>, tokens: Arc<TokenService>) -> Result<Self, AuthError> {
        let dummy_hash = hash_password("minibank-timing-equalizer")?;
        Ok(Self {
            store,
            tokens,
            dummy_hash,
        })
    }

    /// Check credentials and issue a token
    ///
    /// Unknown usernames and wrong passwords both yield
    /// [`AuthError::InvalidCredentials`].
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResult, AuthError> {
        debug!("Login attempt for account: {}", username);

        let account = match self.store.get_account_by_username(username).await {
            Ok(account) => Some(account),
            Err(DbError::NotFound(_)) => None,
            Err(e) => return Err(AuthError::Persistence(e)),
        };

        let hash_to_verify = account
            .as_ref()
            .map(|a| a.password_hash.as_str())
            .unwrap_or(self.dummy_hash.as_str());
        let password_valid = verify_password(password, hash_to_verify);

        let account = match (account, password_valid) {
            (Some(account), true) => account,
            _ => {
                debug!("Login failed for account: {}", username);
                return Err(AuthError::InvalidCredentials);
            }
        };

        let token = self.tokens.issue(&account)?;

        info!("Account {} logged in", account.username);

        Ok(LoginResult {
            token,
            username: account.username,
        })
    }

    /// Hash the password, assign a fresh account number and persist
    pub async fn create_account(&self, request: NewAccountRequest) -> Result<Account, AuthError> {
        request.validate()?;

        debug!("Creating account: {}", request.username);

        let password_hash = hash_password(&request.password)?;
        let number = self.allocate_account_number().await?;

        let account = self
            .store
            .create_account(NewAccount {
                first_name: request.first_name,
                last_name: request.last_name,
                username: request.username,
                email: request.email,
                number,
                password_hash,
                balance: 0,
                created_at: Utc::now(),
            })
            .await?;

        info!("Created account {} (id {})", account.username, account.id);
        Ok(account)
    }

    /// Draw random account numbers until one is unused
    async fn allocate_account_number(&self) -> Result<i64, AuthError> {
        for _ in 0..MAX_NUMBER_ATTEMPTS {
            let candidate = rand::thread_rng().gen_range(MIN_ACCOUNT_NUMBER..=MAX_ACCOUNT_NUMBER);
            if self.store.get_account_by_number(candidate).await?.is_none() {
                return Ok(candidate);
            }
            debug!("Account number collision, drawing again");
        }

        Err(AuthError::Persistence(DbError::Duplicate(
            "No free account number found".to_string(),
        )))
    }
}
