//! Password hashing using Argon2id

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use tracing::warn;

use crate::error::AuthError;

/// Longest plaintext accepted for hashing, in bytes
pub const MAX_PASSWORD_LENGTH: usize = 256;

/// Hash a password with a fresh salt, returning a PHC string
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(AuthError::PasswordHash(format!(
            "password exceeds {} bytes",
            MAX_PASSWORD_LENGTH
        )));
    }

    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::PasswordHash(e.to_string()))
}

/// Verify a password against a stored PHC hash
///
/// Returns `false` on mismatch and on an unparsable hash; the comparison
/// itself is constant-time.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("Stored password hash is malformed: {}", e);
            return false;
        }
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_and_verify() {
        let hash = hash_password("secret123").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("secret123"));
        assert!(verify_password("secret123", &hash));
        assert!(!verify_password("secret124", &hash));
        assert!(!verify_password("", &hash));
    }

    #[test]
    fn test_same_password_different_salts() {
        let hash1 = hash_password("secret123").unwrap();
        let hash2 = hash_password("secret123").unwrap();

        assert_ne!(hash1, hash2);
        assert!(verify_password("secret123", &hash1));
        assert!(verify_password("secret123", &hash2));
    }

    #[test]
    fn test_overlong_password_is_a_hashing_error() {
        let long = "x".repeat(MAX_PASSWORD_LENGTH + 1);
        assert!(matches!(hash_password(&long), Err(AuthError::PasswordHash(_))));

        let at_limit = "x".repeat(MAX_PASSWORD_LENGTH);
        assert!(hash_password(&at_limit).is_ok());
    }

    #[test]
    fn test_malformed_hash_does_not_verify() {
        assert!(!verify_password("secret123", "not-a-phc-string"));
        assert!(!verify_password("secret123", ""));
    }
}
