//! Account store trait

use async_trait::async_trait;

use crate::error::DbError;
use crate::models::{Account, NewAccount};

/// Account persistence boundary
///
/// Implementations own id assignment and enforce uniqueness of both
/// `username` and `number`. Lookups that find nothing fail with
/// [`DbError::NotFound`].
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Persist a new account and return it with its assigned id
    async fn create_account(&self, account: NewAccount) -> Result<Account, DbError>;

    /// Get an account by store-assigned id
    async fn get_account_by_id(&self, id: i64) -> Result<Account, DbError>;

    /// Get an account by username
    async fn get_account_by_username(&self, username: &str) -> Result<Account, DbError>;

    /// Find an account by account number
    async fn get_account_by_number(&self, number: i64) -> Result<Option<Account>, DbError>;

    /// Update names, email and balance of an existing account
    async fn update_account(&self, account: &Account) -> Result<(), DbError>;

    /// Delete an account by id
    async fn delete_account(&self, id: i64) -> Result<(), DbError>;

    /// List all accounts ordered by id
    async fn get_accounts(&self) -> Result<Vec<Account>, DbError>;

    /// Check that the backing store answers
    async fn ping(&self) -> Result<(), DbError> {
        Ok(())
    }
}
