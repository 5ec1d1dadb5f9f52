//! Configuration management for the API server
//!
//! Loaded from environment variables, with a `.env` file picked up in
//! development.
//!
//! # Environment Variables
//!
//! - `API_HOST`: Host to bind to (default: 0.0.0.0)
//! - `API_PORT`: Port to bind to (default: 8080)
//! - `CORS_ORIGINS`: Comma-separated allowed origins, `*` for any (default: `*`)
//! - `PRODUCTION`: Enables HSTS (default: false)
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
//! - `JWT_SECRET`: Secret key for JWT signing, at least 32 characters (required)
//! - `INVITATION_TTL_HOURS`: Invitation lifetime (default: 72)
//! - `RUN_MIGRATIONS`: Apply migrations at startup (default: true)
//!
//! # Example
//!
//! ```no_run
//! use linemark_api::config::Config;
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = Config::from_env()?;
//! println!("Server will listen on {}", config.bind_address());
//! # Ok(())
//! # }
//! ```

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::env;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub invitations: InvitationConfig,

    /// Apply pending migrations before serving
    pub run_migrations: bool,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,

    /// Allowed CORS origins; `["*"]` allows any
    pub cors_origins: Vec<String>,

    /// Production mode (HSTS on)
    pub production: bool,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Secret key for JWT signing
    ///
    /// Generate with: `openssl rand -hex 32`
    #[serde(skip_serializing)]
    pub secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvitationConfig {
    pub ttl_hours: i64,
}

impl InvitationConfig {
    pub fn ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.ttl_hours)
    }
}

const MIN_JWT_SECRET_LENGTH: usize = 32;

impl Config {
    /// Loads configuration from the process environment
    ///
    /// # Errors
    ///
    /// Fails when a required variable is missing or a value does not parse.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let host = var("API_HOST", "0.0.0.0");
        let port = var("API_PORT", "8080")
            .parse::<u16>()
            .context("API_PORT must be a port number")?;

        let cors_origins: Vec<String> = var("CORS_ORIGINS", "*")
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let production = parse_bool(&var("PRODUCTION", "false")).context("PRODUCTION")?;

        let database_url =
            lookup("DATABASE_URL").context("DATABASE_URL environment variable is required")?;
        let max_connections = var("DATABASE_MAX_CONNECTIONS", "10")
            .parse::<u32>()
            .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?;

        let jwt_secret =
            lookup("JWT_SECRET").context("JWT_SECRET environment variable is required")?;
        if jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            anyhow::bail!("JWT_SECRET must be at least {MIN_JWT_SECRET_LENGTH} characters long");
        }

        let ttl_hours = var("INVITATION_TTL_HOURS", "72")
            .parse::<i64>()
            .context("INVITATION_TTL_HOURS must be an integer")?;
        if ttl_hours <= 0 {
            anyhow::bail!("INVITATION_TTL_HOURS must be positive");
        }

        let run_migrations = parse_bool(&var("RUN_MIGRATIONS", "true")).context("RUN_MIGRATIONS")?;

        Ok(Self {
            api: ApiConfig {
                host,
                port,
                cors_origins,
                production,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            jwt: JwtConfig { secret: jwt_secret },
            invitations: InvitationConfig { ttl_hours },
            run_migrations,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    pub fn allows_any_origin(&self) -> bool {
        self.api.cors_origins.iter().any(|origin| origin == "*")
    }
}

fn parse_bool(value: &str) -> anyhow::Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("expected a boolean, got {:?}", other),
    }
}
