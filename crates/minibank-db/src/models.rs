//! Database models

use crate::utils::parse_datetime_or_now;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Row;
use std::fmt;

/// Bank account model
///
/// `number` is the random account number handed out at creation and
/// embedded in issued tokens; `id` is assigned by the store.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub number: i64,
    /// Argon2 PHC string (never serialized)
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub balance: i64,
    pub created_at: DateTime<Utc>,
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("number", &self.number)
            .field("password_hash", &"<redacted>")
            .field("balance", &self.balance)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// New account (for insertion)
#[derive(Clone)]
pub struct NewAccount {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub number: i64,
    pub password_hash: String,
    pub balance: i64,
    pub created_at: DateTime<Utc>,
}

impl NewAccount {
    /// Attach a store-assigned id
    pub fn into_account(self, id: i64) -> Account {
        Account {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            username: self.username,
            email: self.email,
            number: self.number,
            password_hash: self.password_hash,
            balance: self.balance,
            created_at: self.created_at,
        }
    }
}

impl fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewAccount")
            .field("username", &self.username)
            .field("number", &self.number)
            .field("password_hash", &"<redacted>")
            .finish_non_exhaustive()
    }
}

// ==================== TryFrom Implementations ====================

impl TryFrom<&sqlx::sqlite::SqliteRow> for Account {
    type Error = sqlx::Error;

    fn try_from(row: &sqlx::sqlite::SqliteRow) -> Result<Self, Self::Error> {
        Ok(Account {
            id: row.try_get("id")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            username: row.try_get("username")?,
            email: row.try_get("email")?,
            number: row.try_get("number")?,
            password_hash: row.try_get("password_hash")?,
            balance: row.try_get("balance")?,
            created_at: parse_datetime_or_now(&row.try_get::<String, _>("created_at")?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Account {
        NewAccount {
            first_name: "Alice".to_string(),
            last_name: "Liddell".to_string(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            number: 4242,
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
            balance: 0,
            created_at: Utc::now(),
        }
        .into_account(7)
    }

    #[test]
    fn test_password_hash_is_not_serialized() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("argon2"));
        assert!(json.contains("\"number\":4242"));
    }

    #[test]
    fn test_debug_redacts_password_hash() {
        let debug = format!("{:?}", sample());
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("argon2"));
    }
}
