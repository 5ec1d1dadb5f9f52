//! # Linemark API Server Library
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration from the environment
//! - `error`: Error handling and HTTP response mapping
//! - `middleware`: Security headers
//! - `routes`: Route handlers, one module per resource

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
