//! API tokens for registered users
//!
//! Only the SHA-256 hex digest of a token is stored.

use sha2::{Digest, Sha256};

const TOKEN_PREFIX: &str = "pp_";

/// Generate a new random API token
pub fn generate_api_token() -> String {
    let bytes: [u8; 32] = rand::random();
    format!("{}{}", TOKEN_PREFIX, hex::encode(bytes))
}

/// Hash a token for storage and lookup
pub fn hash_api_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.trim().as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_are_unique_and_prefixed() {
        let a = generate_api_token();
        let b = generate_api_token();
        assert_ne!(a, b);
        assert!(a.starts_with(TOKEN_PREFIX));
        assert_eq!(a.len(), TOKEN_PREFIX.len() + 64);
    }

    #[test]
    fn test_hash_is_stable() {
        let token = generate_api_token();
        assert_eq!(hash_api_token(&token), hash_api_token(&token));
        assert_ne!(hash_api_token(&token), token);
        assert_eq!(hash_api_token(&token).len(), 64);
    }
}
