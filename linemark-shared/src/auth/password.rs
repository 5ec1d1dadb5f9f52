//! Password hashing and policy
//!
//! Passwords are stored as Argon2id PHC strings. The cost parameters are
//! embedded in each hash, so verification keeps working if they change.
//!
//! | Parameter   | Value  |
//! |-------------|--------|
//! | memory      | 64 MiB |
//! | iterations  | 3      |
//! | parallelism | 4      |
//! | output      | 32 B   |
//!
//! # Example
//!
//! ```
//! use linemark_shared::auth::password::{hash_password, verify_password};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let hash = hash_password("Groundsman42")?;
//! assert!(verify_password("Groundsman42", &hash)?);
//! assert!(!verify_password("groundsman42", &hash)?);
//! # Ok(())
//! # }
//! ```

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, ParamsBuilder, Version,
};

/// Minimum accepted password length, in characters
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum accepted password length, in characters
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Error type for password hashing operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    HashError(String),

    #[error("Failed to verify password: {0}")]
    VerifyError(String),

    #[error("Invalid password hash format: {0}")]
    InvalidHash(String),
}

fn hasher() -> Result<Argon2<'static>, PasswordError> {
    let params = ParamsBuilder::new()
        .m_cost(65536)
        .t_cost(3)
        .p_cost(4)
        .output_len(32)
        .build()
        .map_err(|e| PasswordError::HashError(format!("Invalid parameters: {}", e)))?;

    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hashes a password with a fresh random salt
///
/// # Errors
///
/// Returns `PasswordError::HashError` if hashing fails
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashError(e.to_string()))?;

    Ok(hash.to_string())
}

/// Checks `password` against a stored PHC hash
///
/// Returns `Ok(false)` for a wrong password and an error only when the
/// stored hash itself is unusable.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(hash).map_err(|e| PasswordError::InvalidHash(e.to_string()))?;
    // "$argon2id$x" parses but carries no output to compare against
    if parsed.hash.is_none() {
        return Err(PasswordError::InvalidHash("missing hash output".to_string()));
    }

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(e.to_string())),
    }
}

/// Applies the account password policy
///
/// Passwords must be 8 to 128 characters and contain at least one letter
/// and one digit.
///
/// ```
/// use linemark_shared::auth::password::validate_password_strength;
///
/// assert!(validate_password_strength("Groundsman42").is_ok());
/// assert!(validate_password_strength("short1").is_err());
/// assert!(validate_password_strength("nodigitshere").is_err());
/// ```
pub fn validate_password_strength(password: &str) -> Result<(), String> {
    let length = password.chars().count();
    if length < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LENGTH
        ));
    }
    if length > MAX_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at most {} characters long",
            MAX_PASSWORD_LENGTH
        ));
    }
    if !password.chars().any(char::is_alphabetic) {
        return Err("Password must contain at least one letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("Password must contain at least one digit".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_uses_argon2id_parameters() {
        let hash = hash_password("Groundsman42").expect("Hash should succeed");

        assert!(hash.starts_with("$argon2id$v=19$"));
        assert!(hash.contains("m=65536,t=3,p=4"));
    }

    #[test]
    fn test_same_password_hashes_differently() {
        let a = hash_password("Groundsman42").unwrap();
        let b = hash_password("Groundsman42").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_verify_round_trip() {
        for password in ["Groundsman42", "with spaces 1", "unicode-pässwörd-9"] {
            let hash = hash_password(password).unwrap();
            assert!(verify_password(password, &hash).unwrap(), "{password}");
            assert!(!verify_password("not-it-0", &hash).unwrap());
        }
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(verify_password("Groundsman42", "plaintext").is_err());
        assert!(matches!(
            verify_password("Groundsman42", "$argon2id$broken"),
            Err(PasswordError::InvalidHash(_))
        ));

        // Real hash with its output cut off
        let hash = hash_password("Groundsman42").unwrap();
        let truncated = &hash[..hash.rfind('$').unwrap()];
        assert!(matches!(
            verify_password("Groundsman42", truncated),
            Err(PasswordError::InvalidHash(_))
        ));
    }

    #[test]
    fn test_password_policy() {
        assert!(validate_password_strength("paint4lines").is_ok());

        let err = validate_password_strength("abc123").unwrap_err();
        assert!(err.contains("at least 8"));

        let err = validate_password_strength("12345678").unwrap_err();
        assert!(err.contains("letter"));

        let err = validate_password_strength("abcdefgh").unwrap_err();
        assert!(err.contains("digit"));

        let long = format!("a1{}", "x".repeat(MAX_PASSWORD_LENGTH));
        assert!(validate_password_strength(&long).unwrap_err().contains("at most"));
    }
}
