//! HTTP middleware
//!
//! Authentication lives in `linemark_shared::auth::middleware`; this module
//! holds response-level concerns.

pub mod security;
