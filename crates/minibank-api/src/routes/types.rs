//! Request/Response DTOs

use minibank_db::Account;
use serde::{Deserialize, Serialize};

// ==================== Auth Types ====================

/// Login request
#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response
#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    pub expires_in: i64,
}

// ==================== Account Types ====================

/// Account response (without password hash)
#[derive(Serialize)]
pub struct AccountResponse {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub number: i64,
    pub balance: i64,
    pub created_at: String,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            first_name: account.first_name,
            last_name: account.last_name,
            username: account.username,
            email: account.email,
            number: account.number,
            balance: account.balance,
            created_at: account.created_at.to_rfc3339(),
        }
    }
}

/// Delete confirmation
#[derive(Serialize)]
pub struct DeletedResponse {
    pub deleted: i64,
}
