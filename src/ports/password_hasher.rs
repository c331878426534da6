//! Password hashing port.

use crate::domain::foundation::DomainError;

/// Hashes and verifies passwords. Implementations produce self-describing
/// hash strings (salt and parameters included).
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, DomainError>;

    /// `Ok(false)` on mismatch; errors only for malformed hashes.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, DomainError>;
}
