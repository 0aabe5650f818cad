//! One-way salted password hashing (bcrypt).
//!
//! Both functions are CPU-bound on purpose; async callers should run them on a
//! blocking thread.

use thiserror::Error;

/// Work factor used when none is configured.
pub const DEFAULT_COST: u32 = 10;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("password comparison failed: {0}")]
    Comparison(String),
}

/// A bcrypt digest. Never holds plaintext; `Debug` does not print the digest.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap a digest loaded from storage.
    pub fn from_digest(digest: impl Into<String>) -> Self {
        Self(digest.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

pub fn hash_password(plaintext: &str, cost: u32) -> Result<PasswordHash, PasswordError> {
    bcrypt::hash(plaintext, cost)
        .map(PasswordHash)
        .map_err(|e| PasswordError::Hashing(e.to_string()))
}

/// Compare `plaintext` against a stored digest.
///
/// `Ok(false)` means the password is wrong; `Err` means the digest itself is unusable.
pub fn verify_password(plaintext: &str, hash: &PasswordHash) -> Result<bool, PasswordError> {
    bcrypt::verify(plaintext, hash.as_str()).map_err(|e| PasswordError::Comparison(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Minimum bcrypt cost keeps the suite fast.
    const TEST_COST: u32 = 4;

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("correct horse", TEST_COST).unwrap();
        assert_ne!(hash.as_str(), "correct horse");
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("battery staple", &hash).unwrap());
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let a = hash_password("pw", TEST_COST).unwrap();
        let b = hash_password("pw", TEST_COST).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn invalid_cost_is_a_hashing_error() {
        let err = hash_password("pw", 3).unwrap_err();
        assert!(matches!(err, PasswordError::Hashing(_)));
    }

    #[test]
    fn malformed_digest_is_a_comparison_error() {
        let err = verify_password("pw", &PasswordHash::from_digest("not-a-bcrypt-hash")).unwrap_err();
        assert!(matches!(err, PasswordError::Comparison(_)));
    }

    #[test]
    fn debug_does_not_leak_digest() {
        let hash = hash_password("pw", TEST_COST).unwrap();
        assert!(!format!("{hash:?}").contains(hash.as_str()));
    }
}
