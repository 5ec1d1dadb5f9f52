//! Sportsgrounds: named venues owned by a user
//!
//! A sportsground fixes the map view (center and zoom) that the editor opens
//! on. Deleting one cascades to its configurations and their bookings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::pagination::Pagination;

pub const MIN_ZOOM: i16 = 1;
pub const MAX_ZOOM: i16 = 22;
pub const DEFAULT_ZOOM: i16 = 18;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Sportsground {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub center_lat: f64,
    pub center_lng: f64,
    pub default_zoom: i16,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSportsground {
    pub owner_id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub center_lat: f64,
    pub center_lng: f64,
    pub default_zoom: i16,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateSportsground {
    pub name: Option<String>,
    pub address: Option<Option<String>>,
    pub center_lat: Option<f64>,
    pub center_lng: Option<f64>,
    pub default_zoom: Option<i16>,
}

/// Admin listing row with owner and configuration count
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SportsgroundSummary {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub owner_email: String,
    pub name: String,
    pub address: Option<String>,
    pub configuration_count: i64,
    pub created_at: DateTime<Utc>,
}

const SPORTSGROUND_COLUMNS: &str =
    "id, owner_id, name, address, center_lat, center_lng, default_zoom, created_at, updated_at";

impl Sportsground {
    pub async fn create(pool: &PgPool, data: CreateSportsground) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO sportsgrounds (owner_id, name, address, center_lat, center_lng, default_zoom)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {SPORTSGROUND_COLUMNS}"
        );

        sqlx::query_as::<_, Sportsground>(&query)
            .bind(data.owner_id)
            .bind(data.name)
            .bind(data.address)
            .bind(data.center_lat)
            .bind(data.center_lng)
            .bind(data.default_zoom)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {SPORTSGROUND_COLUMNS} FROM sportsgrounds WHERE id = $1");

        sqlx::query_as::<_, Sportsground>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Sportsgrounds owned by one user, optionally filtered by name/address
    pub async fn list_by_owner(
        pool: &PgPool,
        owner_id: Uuid,
        search: Option<&str>,
        page: Pagination,
    ) -> Result<(Vec<Self>, i64), sqlx::Error> {
        let query = format!(
            "SELECT {SPORTSGROUND_COLUMNS} FROM sportsgrounds
             WHERE owner_id = $1
               AND ($2::text IS NULL OR name ILIKE $2 OR address ILIKE $2)
             ORDER BY name ASC
             LIMIT $3 OFFSET $4"
        );

        let items = sqlx::query_as::<_, Sportsground>(&query)
            .bind(owner_id)
            .bind(search)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await?;

        let (total,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sportsgrounds
             WHERE owner_id = $1
               AND ($2::text IS NULL OR name ILIKE $2 OR address ILIKE $2)",
        )
        .bind(owner_id)
        .bind(search)
        .fetch_one(pool)
        .await?;

        Ok((items, total))
    }

    /// Every sportsground with owner email and configuration count
    pub async fn list_all(
        pool: &PgPool,
        search: Option<&str>,
        page: Pagination,
    ) -> Result<(Vec<SportsgroundSummary>, i64), sqlx::Error> {
        let items = sqlx::query_as::<_, SportsgroundSummary>(
            "SELECT s.id, s.owner_id, u.email AS owner_email, s.name, s.address,
                    (SELECT COUNT(*) FROM field_configurations c WHERE c.sportsground_id = s.id)
                        AS configuration_count,
                    s.created_at
             FROM sportsgrounds s
             JOIN users u ON u.id = s.owner_id
             WHERE ($1::text IS NULL OR s.name ILIKE $1 OR s.address ILIKE $1 OR u.email ILIKE $1)
             ORDER BY s.created_at DESC
             LIMIT $2 OFFSET $3",
        )
        .bind(search)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(pool)
        .await?;

        let (total,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*)
             FROM sportsgrounds s
             JOIN users u ON u.id = s.owner_id
             WHERE ($1::text IS NULL OR s.name ILIKE $1 OR s.address ILIKE $1 OR u.email ILIKE $1)",
        )
        .bind(search)
        .fetch_one(pool)
        .await?;

        Ok((items, total))
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateSportsground,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE sportsgrounds SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.address.is_some() {
            bind_count += 1;
            query.push_str(&format!(", address = ${}", bind_count));
        }
        if data.center_lat.is_some() {
            bind_count += 1;
            query.push_str(&format!(", center_lat = ${}", bind_count));
        }
        if data.center_lng.is_some() {
            bind_count += 1;
            query.push_str(&format!(", center_lng = ${}", bind_count));
        }
        if data.default_zoom.is_some() {
            bind_count += 1;
            query.push_str(&format!(", default_zoom = ${}", bind_count));
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {SPORTSGROUND_COLUMNS}"));

        let mut q = sqlx::query_as::<_, Sportsground>(&query).bind(id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(address) = data.address {
            q = q.bind(address);
        }
        if let Some(lat) = data.center_lat {
            q = q.bind(lat);
        }
        if let Some(lng) = data.center_lng {
            q = q.bind(lng);
        }
        if let Some(zoom) = data.default_zoom {
            q = q.bind(zoom);
        }

        q.fetch_optional(pool).await
    }

    /// Hands the sportsground to another user
    ///
    /// Its configurations keep their owners; each is transferred separately.
    pub async fn transfer_owner(
        pool: &PgPool,
        id: Uuid,
        new_owner_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "UPDATE sportsgrounds SET owner_id = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {SPORTSGROUND_COLUMNS}"
        );

        sqlx::query_as::<_, Sportsground>(&query)
            .bind(id)
            .bind(new_owner_id)
            .fetch_optional(pool)
            .await
    }

    /// Deletes the sportsground and, by cascade, its configurations and bookings
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sportsgrounds WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sportsgrounds")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoom_range() {
        assert!((MIN_ZOOM..=MAX_ZOOM).contains(&DEFAULT_ZOOM));
    }

    #[test]
    fn test_update_default_changes_nothing() {
        let update = UpdateSportsground::default();
        assert!(update.name.is_none());
        assert!(update.address.is_none());
        assert!(update.default_zoom.is_none());
    }
}
