//! Schema migrations
//!
//! Migrations are embedded at compile time from the workspace `migrations/`
//! directory as reversible `{version}_{name}.up.sql` / `.down.sql` pairs.
//! The second migration seeds the built-in sport templates.
//!
//! # Example
//!
//! ```no_run
//! use linemark_shared::db::migrations::{ensure_database_exists, run_migrations};
//! use linemark_shared::db::pool::{create_pool, DatabaseConfig};
//!
//! # async fn example(url: String) -> Result<(), Box<dyn std::error::Error>> {
//! ensure_database_exists(&url).await?;
//! let pool = create_pool(DatabaseConfig { url, ..Default::default() }).await?;
//! run_migrations(&pool).await?;
//! # Ok(())
//! # }
//! ```

use sqlx::{
    migrate::{MigrateDatabase, MigrateError, Migrator},
    postgres::PgPool,
    Postgres,
};
use tracing::{debug, info, warn};

static MIGRATOR: Migrator = sqlx::migrate!("../migrations");

/// Applied migrations compared against the embedded set
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct MigrationStatus {
    pub applied: usize,
    pub available: usize,
    pub latest_version: Option<i64>,
}

impl MigrationStatus {
    pub fn is_up_to_date(&self) -> bool {
        self.applied >= self.available
    }
}

/// Applies pending migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrateError> {
    info!(available = available_migrations(), "Running database migrations");

    MIGRATOR.run(pool).await.map_err(|e| {
        warn!(error = %e, "Migration failed");
        e
    })?;

    info!("Database schema is up to date");
    Ok(())
}

/// Number of migrations compiled into this binary
pub fn available_migrations() -> usize {
    MIGRATOR.iter().filter(|m| m.migration_type.is_up_migration()).count()
}

pub async fn migration_status(pool: &PgPool) -> Result<MigrationStatus, sqlx::Error> {
    let table_exists: bool = sqlx::query_scalar(
        "SELECT EXISTS (
            SELECT FROM information_schema.tables
            WHERE table_schema = 'public' AND table_name = '_sqlx_migrations'
        )",
    )
    .fetch_one(pool)
    .await?;

    let available = available_migrations();

    if !table_exists {
        debug!("Migrations table does not exist yet");
        return Ok(MigrationStatus {
            applied: 0,
            available,
            latest_version: None,
        });
    }

    let (applied, latest_version): (i64, Option<i64>) = sqlx::query_as(
        "SELECT COUNT(*), MAX(version) FROM _sqlx_migrations WHERE success = true",
    )
    .fetch_one(pool)
    .await?;

    Ok(MigrationStatus {
        applied: applied as usize,
        available,
        latest_version,
    })
}

/// Creates the database named in `database_url` when it is missing
pub async fn ensure_database_exists(database_url: &str) -> Result<(), sqlx::Error> {
    if Postgres::database_exists(database_url).await? {
        debug!("Database already exists");
        return Ok(());
    }

    info!("Database does not exist, creating it");
    Postgres::create_database(database_url).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_migrations() {
        // schema + template seed
        assert_eq!(available_migrations(), 2);
    }

    #[test]
    fn test_status_up_to_date() {
        let behind = MigrationStatus {
            applied: 1,
            available: 2,
            latest_version: Some(20250301000000),
        };
        assert!(!behind.is_up_to_date());

        let current = MigrationStatus { applied: 2, ..behind };
        assert!(current.is_up_to_date());
    }
}
