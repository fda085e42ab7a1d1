//! Opaque session tokens.
//!
//! A token is 32 bytes from the operating system RNG, hex encoded. Only the
//! SHA-256 digest of a token is persisted, so a leaked `sessions` table does
//! not yield usable bearer tokens.

use std::fmt;

use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};

const TOKEN_BYTES: usize = 32;

/// A freshly issued bearer token. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn generate() -> Self {
        let mut bytes = [0u8; TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    /// Digest stored in `sessions.token_hash`.
    pub fn digest(&self) -> String {
        hash_session_token(&self.0)
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(..)")
    }
}

/// Hex-encoded SHA-256 of a presented token.
pub fn hash_session_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_tokens_are_hex_and_unique() {
        let a = SessionToken::generate();
        let b = SessionToken::generate();

        assert_eq!(a.as_str().len(), TOKEN_BYTES * 2);
        assert!(a.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_digest_matches_presented_token() {
        let token = SessionToken::generate();
        assert_eq!(token.digest(), hash_session_token(token.as_str()));
        assert_ne!(token.digest(), token.as_str());
    }

    #[test]
    fn test_debug_hides_secret() {
        let token = SessionToken::generate();
        assert_eq!(format!("{:?}", token), "SessionToken(..)");
    }
}
