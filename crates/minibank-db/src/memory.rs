//! In-memory account store

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;

use crate::error::DbError;
use crate::models::{Account, NewAccount};
use crate::store::AccountStore;

#[derive(Default)]
struct Inner {
    next_id: i64,
    accounts: BTreeMap<i64, Account>,
}

/// Account store backed by a map, with the same contract as [`crate::Database`]
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn create_account(&self, account: NewAccount) -> Result<Account, DbError> {
        let mut inner = self.inner.write();

        if inner.accounts.values().any(|a| a.username == account.username) {
            return Err(DbError::Duplicate(format!(
                "Account '{}' already exists",
                account.username
            )));
        }
        if inner.accounts.values().any(|a| a.number == account.number) {
            return Err(DbError::Duplicate(format!(
                "Account number {} already in use",
                account.number
            )));
        }

        inner.next_id += 1;
        let account = account.into_account(inner.next_id);
        inner.accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn get_account_by_id(&self, id: i64) -> Result<Account, DbError> {
        self.inner
            .read()
            .accounts
            .get(&id)
            .cloned()
            .ok_or_else(|| DbError::NotFound(format!("Account id {}", id)))
    }

    async fn get_account_by_username(&self, username: &str) -> Result<Account, DbError> {
        self.inner
            .read()
            .accounts
            .values()
            .find(|a| a.username == username)
            .cloned()
            .ok_or_else(|| DbError::NotFound(format!("Account '{}'", username)))
    }

    async fn get_account_by_number(&self, number: i64) -> Result<Option<Account>, DbError> {
        Ok(self
            .inner
            .read()
            .accounts
            .values()
            .find(|a| a.number == number)
            .cloned())
    }

    async fn update_account(&self, account: &Account) -> Result<(), DbError> {
        let mut inner = self.inner.write();
        let stored = inner
            .accounts
            .get_mut(&account.id)
            .ok_or_else(|| DbError::NotFound(format!("Account id {}", account.id)))?;

        stored.first_name = account.first_name.clone();
        stored.last_name = account.last_name.clone();
        stored.email = account.email.clone();
        stored.balance = account.balance;
        Ok(())
    }

    async fn delete_account(&self, id: i64) -> Result<(), DbError> {
        self.inner
            .write()
            .accounts
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| DbError::NotFound(format!("Account id {}", id)))
    }

    async fn get_accounts(&self) -> Result<Vec<Account>, DbError> {
        Ok(self.inner.read().accounts.values().cloned().collect())
    }
}
