//! Password hashing with bcrypt.

use std::sync::OnceLock;

use anyhow::anyhow;
use bcrypt::{hash, verify};

use crate::errors::AppError;

/// bcrypt work factor used for every stored credential.
pub const PASSWORD_HASH_COST: u32 = 10;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, PASSWORD_HASH_COST)
        .map_err(|e| AppError::internal(anyhow!("Failed to hash password: {}", e)))
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    verify(password, hash)
        .map_err(|e| AppError::internal(anyhow!("Failed to verify password: {}", e)))
}

/// Runs a bcrypt verification against a throwaway hash.
///
/// Login calls this when no credential exists so that unknown emails take
/// as long to reject as wrong passwords.
pub fn burn_verification(password: &str) {
    static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();

    if let Some(dummy) = DUMMY_HASH.get_or_init(|| hash("sekolah-dummy", PASSWORD_HASH_COST).ok())
    {
        let _ = verify(password, dummy);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_uses_configured_cost() {
        let hash = hash_password("rahasia123").unwrap();
        assert!(hash.starts_with("$2b$10$"));
    }

    #[test]
    fn test_verify_round_trip() {
        let hash = hash_password("rahasia123").unwrap();
        assert!(verify_password("rahasia123", &hash).unwrap());
        assert!(!verify_password("salah", &hash).unwrap());
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        assert!(verify_password("rahasia123", "not_a_bcrypt_hash").is_err());
    }
}
