//! Opaque one-time tokens
//!
//! Used for invitation links. The plaintext token is shown once; only its
//! SHA-256 digest is stored, so a database leak does not expose usable
//! tokens.
//!
//! Format: `lmi_` followed by 64 lowercase hex characters (32 random bytes).
//!
//! # Example
//!
//! ```
//! use linemark_shared::auth::token::{generate_token, hash_token, validate_token_format};
//!
//! let (token, hash) = generate_token();
//! assert!(validate_token_format(&token));
//! assert_eq!(hash_token(&token), hash);
//! ```

use rand::RngCore;
use sha2::{Digest, Sha256};

const TOKEN_PREFIX: &str = "lmi_";
const TOKEN_RANDOM_BYTES: usize = 32;

/// Total length of a token string
pub const TOKEN_LENGTH: usize = TOKEN_PREFIX.len() + TOKEN_RANDOM_BYTES * 2;

/// Generates a token, returning `(plaintext, sha256_hex)`
pub fn generate_token() -> (String, String) {
    let mut bytes = [0u8; TOKEN_RANDOM_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);

    let token = format!("{}{}", TOKEN_PREFIX, hex::encode(bytes));
    let hash = hash_token(&token);
    (token, hash)
}

/// SHA-256 of the token, lowercase hex
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Cheap shape check before any database lookup
pub fn validate_token_format(token: &str) -> bool {
    token.len() == TOKEN_LENGTH
        && token.starts_with(TOKEN_PREFIX)
        && token[TOKEN_PREFIX.len()..]
            .bytes()
            .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// Compares a token against a stored digest without early exit
pub fn verify_token(token: &str, stored_hash: &str) -> bool {
    constant_time_eq(hash_token(token).as_bytes(), stored_hash.as_bytes())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_tokens_are_unique_and_well_formed() {
        let (a, hash_a) = generate_token();
        let (b, hash_b) = generate_token();

        assert_ne!(a, b);
        assert_ne!(hash_a, hash_b);
        assert_eq!(a.len(), TOKEN_LENGTH);
        assert!(validate_token_format(&a));
        assert_eq!(hash_a.len(), 64);
    }

    #[test]
    fn test_hash_is_deterministic() {
        assert_eq!(hash_token("lmi_abc"), hash_token("lmi_abc"));
        assert_ne!(hash_token("lmi_abc"), hash_token("lmi_abd"));
        assert_eq!(
            hash_token(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_format_validation() {
        assert!(!validate_token_format("lmi_short"));
        assert!(!validate_token_format(&format!("xxx_{}", "a".repeat(64))));
        assert!(!validate_token_format(&format!("lmi_{}", "G".repeat(64))));
        assert!(validate_token_format(&format!("lmi_{}", "0f".repeat(32))));
    }

    #[test]
    fn test_verify_token() {
        let (token, hash) = generate_token();
        assert!(verify_token(&token, &hash));
        assert!(!verify_token("lmi_wrong", &hash));
        assert!(!verify_token(&token, "short"));
    }
}
