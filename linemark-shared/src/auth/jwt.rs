//! JWT issuing and validation
//!
//! Tokens are HS256-signed and carry the user id, the account role at the
//! time of issue and a token type. Access tokens are short lived; refresh
//! tokens can only be exchanged for a new access token.
//!
//! The role claim is informational: the request middleware reloads the
//! account on every request, so role changes and suspensions take effect
//! immediately.
//!
//! # Example
//!
//! ```
//! use linemark_shared::auth::jwt::{create_token, validate_access_token, Claims, TokenType};
//! use linemark_shared::models::user::UserRole;
//! use uuid::Uuid;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let secret = "a-development-secret-of-32-bytes!";
//! let claims = Claims::new(Uuid::new_v4(), UserRole::User, TokenType::Access);
//! let token = create_token(&claims, secret)?;
//! let validated = validate_access_token(&token, secret)?;
//! assert_eq!(validated.sub, claims.sub);
//! # Ok(())
//! # }
//! ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::UserRole;

/// Issuer claim on every token
pub const ISSUER: &str = "linemark";

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("Failed to create token: {0}")]
    CreateError(String),

    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    #[error("Token has expired")]
    Expired,

    #[error("Invalid token issuer")]
    InvalidIssuer,

    #[error("Expected {expected} token, got {actual}")]
    WrongType {
        expected: &'static str,
        actual: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl TokenType {
    /// Access: 1 hour. Refresh: 30 days.
    pub fn default_expiration(&self) -> Duration {
        match self {
            TokenType::Access => Duration::hours(1),
            TokenType::Refresh => Duration::days(30),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: Uuid,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    pub nbf: i64,
    /// Role at issue time
    pub role: UserRole,
    pub token_type: TokenType,
}

impl Claims {
    pub fn new(user_id: Uuid, role: UserRole, token_type: TokenType) -> Self {
        Self::with_expiration(user_id, role, token_type, token_type.default_expiration())
    }

    pub fn with_expiration(
        user_id: Uuid,
        role: UserRole,
        token_type: TokenType,
        expires_in: Duration,
    ) -> Self {
        let now = Utc::now();

        Self {
            sub: user_id,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + expires_in).timestamp(),
            nbf: now.timestamp(),
            role,
            token_type,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    /// Seconds until expiry, for `expires_in` response fields
    pub fn expires_in(&self) -> i64 {
        (self.exp - Utc::now().timestamp()).max(0)
    }
}

/// Access and refresh token pair returned on login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&Header::new(Algorithm::HS256), claims, &key)
        .map_err(|e| JwtError::CreateError(e.to_string()))
}

/// Issues a fresh access/refresh pair for a user
pub fn issue_token_pair(user_id: Uuid, role: UserRole, secret: &str) -> Result<TokenPair, JwtError> {
    let access = Claims::new(user_id, role, TokenType::Access);
    let refresh = Claims::new(user_id, role, TokenType::Refresh);

    Ok(TokenPair {
        access_token: create_token(&access, secret)?,
        refresh_token: create_token(&refresh, secret)?,
        token_type: "Bearer".to_string(),
        expires_in: access.expires_in(),
    })
}

pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => JwtError::InvalidIssuer,
        _ => JwtError::ValidationError(e.to_string()),
    })?;

    Ok(data.claims)
}

fn expect_type(claims: Claims, expected: TokenType) -> Result<Claims, JwtError> {
    if claims.token_type != expected {
        return Err(JwtError::WrongType {
            expected: expected.as_str(),
            actual: claims.token_type.as_str(),
        });
    }
    Ok(claims)
}

pub fn validate_access_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    expect_type(validate_token(token, secret)?, TokenType::Access)
}

pub fn validate_refresh_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    expect_type(validate_token(token, secret)?, TokenType::Refresh)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_claims_defaults() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, UserRole::Admin, TokenType::Access);

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.iss, "linemark");
        assert_eq!(claims.role, UserRole::Admin);
        assert!(!claims.is_expired());
        assert!(claims.expires_in() > 3500 && claims.expires_in() <= 3600);
    }

    #[test]
    fn test_round_trip() {
        let claims = Claims::new(Uuid::new_v4(), UserRole::SuperAdmin, TokenType::Access);
        let token = create_token(&claims, SECRET).unwrap();

        let validated = validate_access_token(&token, SECRET).unwrap();
        assert_eq!(validated.sub, claims.sub);
        assert_eq!(validated.role, UserRole::SuperAdmin);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let claims = Claims::new(Uuid::new_v4(), UserRole::User, TokenType::Access);
        let token = create_token(&claims, SECRET).unwrap();
        assert!(validate_token(&token, "another-secret-key-32-bytes-long!!").is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let claims = Claims::with_expiration(
            Uuid::new_v4(),
            UserRole::User,
            TokenType::Access,
            Duration::seconds(-3600),
        );
        assert!(claims.is_expired());
        assert_eq!(claims.expires_in(), 0);

        let token = create_token(&claims, SECRET).unwrap();
        assert!(matches!(validate_token(&token, SECRET), Err(JwtError::Expired)));
    }

    #[test]
    fn test_token_types_not_interchangeable() {
        let pair = issue_token_pair(Uuid::new_v4(), UserRole::User, SECRET).unwrap();

        assert!(validate_access_token(&pair.access_token, SECRET).is_ok());
        assert!(validate_refresh_token(&pair.refresh_token, SECRET).is_ok());

        assert!(matches!(
            validate_access_token(&pair.refresh_token, SECRET),
            Err(JwtError::WrongType { expected: "access", .. })
        ));
        assert!(validate_refresh_token(&pair.access_token, SECRET).is_err());
        assert_eq!(pair.token_type, "Bearer");
    }
}
