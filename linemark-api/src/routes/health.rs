//! Health check endpoint
//!
//! ```text
//! GET /health
//! ```
//!
//! ```json
//! {
//!   "status": "healthy",
//!   "version": "0.1.0",
//!   "database": "connected",
//!   "pool": { "active_connections": 1, "idle_connections": 4 }
//! }
//! ```
//!
//! Always answers 200; a failed database round trip reports `degraded`.

use crate::app::AppState;
use axum::{extract::State, Json};
use linemark_shared::db::pool::{health_check as database_health_check, pool_stats, PoolStats};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub database: &'static str,
    pub pool: PoolStats,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let connected = match database_health_check(&state.db).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Health check could not reach the database");
            false
        }
    };

    Json(HealthResponse {
        status: if connected { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        database: if connected { "connected" } else { "disconnected" },
        pool: pool_stats(&state.db),
    })
}
