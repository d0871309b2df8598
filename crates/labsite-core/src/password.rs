//! Admin password hashing with bcrypt

use crate::error::{Error, Result};
use bcrypt::BcryptError;

/// Cost used when none is configured.
pub const DEFAULT_BCRYPT_COST: u32 = 10;

/// Hash written by the bootstrap step; replaced on first successful login.
pub const PLACEHOLDER_HASH: &str = "placeholder:set-on-first-login";

const PLACEHOLDER_MARKERS: [&str; 2] = ["placeholder", "YourHashWillBeGeneratedByApp"];

/// Whether a stored hash is the "password not yet set" sentinel.
pub fn is_placeholder_hash(hash: &str) -> bool {
    PLACEHOLDER_MARKERS.iter().any(|m| hash.contains(m))
}

/// One-way password hasher with a per-call random salt.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn hash(&self, password: &str) -> Result<String> {
        bcrypt::hash(password, self.cost)
            .map_err(|e| Error::Internal(format!("Password hashing failed: {}", e)))
    }

    /// Verify a password against a stored hash.
    ///
    /// Malformed hashes yield `Ok(false)`; only library faults are errors.
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool> {
        match bcrypt::verify(password, hash) {
            Ok(valid) => Ok(valid),
            Err(
                BcryptError::InvalidHash(_)
                | BcryptError::InvalidPrefix(_)
                | BcryptError::InvalidCost(_)
                | BcryptError::InvalidSaltLen(_)
                | BcryptError::InvalidBase64(_),
            ) => Ok(false),
            Err(e) => Err(Error::Internal(format!(
                "Password verification failed: {}",
                e
            ))),
        }
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_BCRYPT_COST)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(4)
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = hasher();
        let hash = hasher.hash("correct horse").unwrap();
        assert!(hash.starts_with("$2"));
        assert!(hasher.verify("correct horse", &hash).unwrap());
        assert!(!hasher.verify("battery staple", &hash).unwrap());
    }

    #[test]
    fn test_salt_differs_per_call() {
        let hasher = hasher();
        let a = hasher.hash("same").unwrap();
        let b = hasher.hash("same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_hash_is_false_not_error() {
        let hasher = hasher();
        assert!(!hasher.verify("pw", "not-a-hash").unwrap());
        assert!(!hasher.verify("pw", "").unwrap());
        assert!(!hasher.verify("pw", PLACEHOLDER_HASH).unwrap());
    }

    #[test]
    fn test_placeholder_detection() {
        assert!(is_placeholder_hash(PLACEHOLDER_HASH));
        assert!(is_placeholder_hash("$2b$10$YourHashWillBeGeneratedByApp"));
        assert!(!is_placeholder_hash("$2b$10$abcdefghijklmnopqrstuv"));
    }
}
