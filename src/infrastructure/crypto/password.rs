//! Password hashing utilities

use bcrypt::{hash, verify, DEFAULT_COST};
use thiserror::Error;

/// bcrypt silently ignores anything past this many bytes.
const MAX_INPUT_BYTES: usize = 72;

#[derive(Debug, Error)]
pub enum HashError {
    /// Plaintext does not match the stored hash.
    #[error("password does not match")]
    Mismatch,

    /// Plaintext is longer than the 72 bytes bcrypt can take in.
    #[error("password longer than 72 bytes")]
    TooLong,

    /// Stored value is not a parseable bcrypt hash.
    #[error("malformed password hash: {0}")]
    Malformed(bcrypt::BcryptError),

    #[error("password hashing failed: {0}")]
    Failure(bcrypt::BcryptError),
}

/// bcrypt hasher with a fixed work factor.
///
/// `Copy` so it can be moved into `spawn_blocking` closures freely.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a password with a fresh random salt. Input past 72 bytes is
    /// refused rather than cut off.
    pub fn hash(&self, plaintext: &str) -> Result<String, HashError> {
        if plaintext.len() > MAX_INPUT_BYTES {
            return Err(HashError::TooLong);
        }
        hash(plaintext, self.cost).map_err(HashError::Failure)
    }

    /// Verify a password against a stored hash
    pub fn verify(&self, password_hash: &str, plaintext: &str) -> Result<(), HashError> {
        // No stored hash was made from more than 72 bytes.
        if plaintext.len() > MAX_INPUT_BYTES {
            return Err(HashError::Mismatch);
        }
        match verify(plaintext, password_hash) {
            Ok(true) => Ok(()),
            Ok(false) => Err(HashError::Mismatch),
            Err(e) => Err(HashError::Malformed(e)),
        }
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_COST)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::MIN_BCRYPT_COST;

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(MIN_BCRYPT_COST)
    }

    #[test]
    fn test_hash_and_verify() {
        let password = "secure_password_123";
        let hashed = hasher().hash(password).unwrap();

        assert_ne!(hashed, password);
        assert!(hasher().verify(&hashed, password).is_ok());
        assert!(matches!(
            hasher().verify(&hashed, "wrong_password"),
            Err(HashError::Mismatch)
        ));
    }

    #[test]
    fn test_salt_differs_per_hash() {
        let a = hasher().hash("secret1").unwrap();
        let b = hasher().hash("secret1").unwrap();
        assert_ne!(a, b);
        assert!(hasher().verify(&a, "secret1").is_ok());
        assert!(hasher().verify(&b, "secret1").is_ok());
    }

    #[test]
    fn test_malformed_hash() {
        let result = hasher().verify("not-a-bcrypt-hash", "secret1");
        assert!(matches!(result, Err(HashError::Malformed(_))));
    }

    #[test]
    fn test_hash_embeds_cost() {
        let hashed = hasher().hash("secret1").unwrap();
        assert!(hashed.starts_with("$2b$04$"));
    }

    #[test]
    fn test_long_passwords_are_not_truncated() {
        let prefix = "a".repeat(72);
        assert!(matches!(
            hasher().hash(&format!("{prefix}REAL-SECRET")),
            Err(HashError::TooLong)
        ));

        let hashed = hasher().hash(&prefix).unwrap();
        assert!(hasher().verify(&hashed, &prefix).is_ok());
        assert!(matches!(
            hasher().verify(&hashed, &format!("{prefix}totally-different")),
            Err(HashError::Mismatch)
        ));
    }
}
