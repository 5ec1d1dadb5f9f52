//! Authentication and authorization
//!
//! # Modules
//!
//! - [`password`]: Argon2id password hashing and strength rules
//! - [`jwt`]: Access and refresh tokens
//! - [`token`]: One-time invitation tokens, stored as SHA-256 digests
//! - [`middleware`]: Bearer-token middleware for Axum
//! - [`authorization`]: Role hierarchy and ownership checks
//!
//! # Example
//!
//! ```no_run
//! use linemark_shared::auth::password::{hash_password, verify_password};
//! use linemark_shared::auth::jwt::{issue_token_pair, validate_access_token};
//! use linemark_shared::models::user::UserRole;
//! use uuid::Uuid;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let hash = hash_password("field-marker-2025")?;
//! assert!(verify_password("field-marker-2025", &hash)?);
//!
//! let secret = "a-development-secret-of-32-bytes!";
//! let pair = issue_token_pair(Uuid::new_v4(), UserRole::User, secret)?;
//! let claims = validate_access_token(&pair.access_token, secret)?;
//! assert_eq!(claims.role, UserRole::User);
//! # Ok(())
//! # }
//! ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod token;
