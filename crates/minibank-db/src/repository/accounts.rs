//! Account operations

use async_trait::async_trait;
use sqlx::Row;
use tracing::debug;

use crate::error::DbError;
use crate::models::{Account, NewAccount};
use crate::repository::Database;
use crate::store::AccountStore;

const ACCOUNT_COLUMNS: &str =
    "id, first_name, last_name, username, email, number, password_hash, balance, created_at";

/// Map a UNIQUE constraint violation to `DbError::Duplicate`
fn map_unique_violation(err: sqlx::Error, what: impl FnOnce() -> String) -> DbError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => DbError::Duplicate(what()),
        _ => DbError::Connection(err),
    }
}

#[async_trait]
impl AccountStore for Database {
    async fn create_account(&self, account: NewAccount) -> Result<Account, DbError> {
        // Check for collisions up front so the caller gets a readable reason
        let existing = sqlx::query("SELECT id FROM accounts WHERE username = ?")
            .bind(&account.username)
            .fetch_optional(&self.pool)
            .await?;
        if existing.is_some() {
            return Err(DbError::Duplicate(format!(
                "Account '{}' already exists",
                account.username
            )));
        }

        let result = sqlx::query(
            r#"
            INSERT INTO accounts
                (first_name, last_name, username, email, number, password_hash, balance, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(&account.username)
        .bind(&account.email)
        .bind(account.number)
        .bind(&account.password_hash)
        .bind(account.balance)
        .bind(account.created_at.to_rfc3339())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            map_unique_violation(e, || {
                format!("Account number {} already in use", account.number)
            })
        })?;

        let id: i64 = result.get("id");
        debug!("Inserted account {} with id {}", account.username, id);

        Ok(account.into_account(id))
    }

    async fn get_account_by_id(&self, id: i64) -> Result<Account, DbError> {
        let query = format!("SELECT {} FROM accounts WHERE id = ?", ACCOUNT_COLUMNS);
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("Account id {}", id)))?;

        Ok(Account::try_from(&row)?)
    }

    async fn get_account_by_username(&self, username: &str) -> Result<Account, DbError> {
        let query = format!("SELECT {} FROM accounts WHERE username = ?", ACCOUNT_COLUMNS);
        let row = sqlx::query(&query)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("Account '{}'", username)))?;

        Ok(Account::try_from(&row)?)
    }

    async fn get_account_by_number(&self, number: i64) -> Result<Option<Account>, DbError> {
        let query = format!("SELECT {} FROM accounts WHERE number = ?", ACCOUNT_COLUMNS);
        let result = sqlx::query(&query)
            .bind(number)
            .fetch_optional(&self.pool)
            .await?;

        result.map(|row| Account::try_from(&row).map_err(DbError::from)).transpose()
    }

    async fn update_account(&self, account: &Account) -> Result<(), DbError> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET first_name = ?, last_name = ?, email = ?, balance = ?
            WHERE id = ?
            "#,
        )
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(&account.email)
        .bind(account.balance)
        .bind(account.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("Account id {}", account.id)));
        }
        Ok(())
    }

    async fn delete_account(&self, id: i64) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("Account id {}", id)));
        }
        Ok(())
    }

    async fn get_accounts(&self) -> Result<Vec<Account>, DbError> {
        let query = format!("SELECT {} FROM accounts ORDER BY id", ACCOUNT_COLUMNS);
        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| Account::try_from(row).map_err(DbError::from))
            .collect()
    }

    async fn ping(&self) -> Result<(), DbError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
