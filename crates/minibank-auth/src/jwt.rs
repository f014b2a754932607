//! JWT token management

use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
    errors::ErrorKind,
};
use minibank_db::Account;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AuthError;

/// The only signing algorithm issued or accepted
const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Account number of the authenticated account
    #[serde(rename = "accountNumber")]
    pub account_number: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

/// Issues and validates HMAC-signed bearer tokens
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    token_ttl: Duration,
}

impl TokenService {
    /// Create a token service from the shared secret
    ///
    /// An empty secret is refused rather than used as an HMAC key.
    pub fn new(secret: &str, token_ttl: Duration) -> Result<Self, AuthError> {
        if secret.trim().is_empty() {
            return Err(AuthError::MissingSecret);
        }

        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            token_ttl,
        })
    }

    /// Lifetime of issued tokens
    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }

    /// Issue a token for an account
    pub fn issue(&self, account: &Account) -> Result<String, AuthError> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(self.token_ttl)
            .ok_or_else(|| AuthError::Signing("token expiry out of range".to_string()))?;
        let claims = Claims {
            account_number: account.number,
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };

        debug!("Issuing token for account id {}", account.id);

        self.sign(&claims)
    }

    fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::new(SIGNING_ALGORITHM), claims, &self.encoding_key)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    /// Validate a token and return its claims
    pub fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            })?;

        if token_data.header.alg != SIGNING_ALGORITHM {
            return Err(AuthError::InvalidToken);
        }

        // Check expiration against the live clock
        let now = Utc::now().timestamp();
        if token_data.claims.exp < now {
            return Err(AuthError::TokenExpired);
        }

        Ok(token_data.claims)
    }
}
