//! # Linemark Shared Library
//!
//! Types, persistence and auth used by the Linemark API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models and their queries
//! - `auth`: Passwords, JWTs, invitation tokens, middleware and the
//!   authorization table
//! - `db`: Connection pool and migrations
//! - `pagination`: Page parameters and paged results
//!
//! Field geometry lives in `linemark-editor`; models store its
//! [`FieldLayout`](linemark_editor::FieldLayout) and marking shapes as-is.

pub mod auth;
pub mod db;
pub mod models;
pub mod pagination;

/// Current version of the Linemark shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
