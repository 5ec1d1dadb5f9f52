//! Field configurations: a placed, sized and rotated field on a sportsground
//!
//! Dimensions are checked strictly against the template bounds at create
//! and update time. The interactive editor clamps instead; by the time a
//! layout reaches the server it must already be in range.
//!
//! # Example
//!
//! ```
//! use linemark_shared::models::field_configuration::LayoutInput;
//! use linemark_editor::{DimensionBounds, FieldLayout};
//!
//! let bounds = DimensionBounds::new(90.0, 120.0, 45.0, 90.0).unwrap();
//! let input = LayoutInput {
//!     center_lat: -33.8688,
//!     center_lng: 151.2093,
//!     rotation: -15.0,
//!     length: 105.0,
//!     width: 68.0,
//!     line_color: "#FFFFFF".to_string(),
//! };
//!
//! let layout: FieldLayout = input.validate(&bounds).unwrap();
//! assert_eq!(layout.rotation, 345.0);
//! assert_eq!(layout.color.as_str(), "#ffffff");
//! ```

use chrono::{DateTime, Utc};
use linemark_editor::{DimensionBounds, FieldLayout, GeometryError, LatLng, LineColor};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::pagination::Pagination;

#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error("Template is not active")]
    InactiveTemplate,

    #[error("New owner must already own the configuration's sportsground")]
    OwnerMismatch,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct FieldConfiguration {
    pub id: Uuid,
    pub sportsground_id: Uuid,
    pub template_id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub center_lat: f64,
    pub center_lng: f64,
    pub rotation: f64,
    pub length: f64,
    pub width: f64,
    pub line_color: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Geometry fields shared by create and update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutInput {
    pub center_lat: f64,
    pub center_lng: f64,
    pub rotation: f64,
    pub length: f64,
    pub width: f64,
    pub line_color: String,
}

impl LayoutInput {
    /// Validates anchor, color and dimensions, normalizing rotation and color
    pub fn validate(&self, bounds: &DimensionBounds) -> Result<FieldLayout, GeometryError> {
        let center = LatLng::new(self.center_lat, self.center_lng);
        center.validate_anchor()?;
        if !self.rotation.is_finite() {
            return Err(GeometryError::NonFinite);
        }
        bounds.check(self.length, self.width)?;
        let color = LineColor::parse(&self.line_color)?;

        Ok(FieldLayout::new(
            center,
            self.rotation,
            self.length,
            self.width,
            color,
        ))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateConfiguration {
    pub sportsground_id: Uuid,
    pub template_id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub layout: FieldLayout,
    pub notes: Option<String>,
}

/// Partial update; geometry fields are merged and re-validated as a whole
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateConfiguration {
    pub name: Option<String>,
    pub template_id: Option<Uuid>,
    pub owner_id: Option<Uuid>,
    pub center_lat: Option<f64>,
    pub center_lng: Option<f64>,
    pub rotation: Option<f64>,
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub line_color: Option<String>,
    pub notes: Option<Option<String>>,
}

impl UpdateConfiguration {
    /// Geometry after applying this update over `current`
    pub fn merged_layout(&self, current: &FieldConfiguration) -> LayoutInput {
        LayoutInput {
            center_lat: self.center_lat.unwrap_or(current.center_lat),
            center_lng: self.center_lng.unwrap_or(current.center_lng),
            rotation: self.rotation.unwrap_or(current.rotation),
            length: self.length.unwrap_or(current.length),
            width: self.width.unwrap_or(current.width),
            line_color: self
                .line_color
                .clone()
                .unwrap_or_else(|| current.line_color.clone()),
        }
    }
}

/// Owner transfer rule: the new owner must own the sportsground already
pub fn check_owner_transfer(
    new_owner_id: Uuid,
    sportsground_owner_id: Uuid,
) -> Result<(), ConfigurationError> {
    if new_owner_id != sportsground_owner_id {
        return Err(ConfigurationError::OwnerMismatch);
    }
    Ok(())
}

const CONFIGURATION_COLUMNS: &str = "id, sportsground_id, template_id, owner_id, name, \
                                     center_lat, center_lng, rotation, length, width, \
                                     line_color, notes, created_at, updated_at";

impl FieldConfiguration {
    /// Stored geometry as an editor layout
    pub fn layout(&self) -> Result<FieldLayout, GeometryError> {
        Ok(FieldLayout::new(
            LatLng::new(self.center_lat, self.center_lng),
            self.rotation,
            self.length,
            self.width,
            LineColor::parse(&self.line_color)?,
        ))
    }

    pub async fn create(pool: &PgPool, data: CreateConfiguration) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO field_configurations
                (sportsground_id, template_id, owner_id, name, center_lat, center_lng,
                 rotation, length, width, line_color, notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING {CONFIGURATION_COLUMNS}"
        );

        let layout = data.layout;
        sqlx::query_as::<_, FieldConfiguration>(&query)
            .bind(data.sportsground_id)
            .bind(data.template_id)
            .bind(data.owner_id)
            .bind(data.name)
            .bind(layout.center.lat)
            .bind(layout.center.lng)
            .bind(layout.rotation)
            .bind(layout.length)
            .bind(layout.width)
            .bind(layout.color.to_string())
            .bind(data.notes)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query =
            format!("SELECT {CONFIGURATION_COLUMNS} FROM field_configurations WHERE id = $1");

        sqlx::query_as::<_, FieldConfiguration>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Configurations owned by a user, optionally limited to one sportsground
    pub async fn list_by_owner(
        pool: &PgPool,
        owner_id: Uuid,
        sportsground_id: Option<Uuid>,
        search: Option<&str>,
        page: Pagination,
    ) -> Result<(Vec<Self>, i64), sqlx::Error> {
        let query = format!(
            "SELECT {CONFIGURATION_COLUMNS} FROM field_configurations
             WHERE owner_id = $1
               AND ($2::uuid IS NULL OR sportsground_id = $2)
               AND ($3::text IS NULL OR name ILIKE $3)
             ORDER BY updated_at DESC
             LIMIT $4 OFFSET $5"
        );

        let items = sqlx::query_as::<_, FieldConfiguration>(&query)
            .bind(owner_id)
            .bind(sportsground_id)
            .bind(search)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await?;

        let (total,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM field_configurations
             WHERE owner_id = $1
               AND ($2::uuid IS NULL OR sportsground_id = $2)
               AND ($3::text IS NULL OR name ILIKE $3)",
        )
        .bind(owner_id)
        .bind(sportsground_id)
        .bind(search)
        .fetch_one(pool)
        .await?;

        Ok((items, total))
    }

    /// Writes a fully merged and validated record
    pub async fn replace(
        pool: &PgPool,
        id: Uuid,
        owner_id: Uuid,
        template_id: Uuid,
        name: String,
        layout: &FieldLayout,
        notes: Option<String>,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "UPDATE field_configurations SET
                owner_id = $2, template_id = $3, name = $4,
                center_lat = $5, center_lng = $6, rotation = $7,
                length = $8, width = $9, line_color = $10, notes = $11
             WHERE id = $1
             RETURNING {CONFIGURATION_COLUMNS}"
        );

        sqlx::query_as::<_, FieldConfiguration>(&query)
            .bind(id)
            .bind(owner_id)
            .bind(template_id)
            .bind(name)
            .bind(layout.center.lat)
            .bind(layout.center.lng)
            .bind(layout.rotation)
            .bind(layout.length)
            .bind(layout.width)
            .bind(layout.color.to_string())
            .bind(notes)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM field_configurations WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM field_configurations")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> DimensionBounds {
        DimensionBounds::new(90.0, 120.0, 45.0, 90.0).unwrap()
    }

    fn input() -> LayoutInput {
        LayoutInput {
            center_lat: -33.8688,
            center_lng: 151.2093,
            rotation: 30.0,
            length: 100.0,
            width: 64.0,
            line_color: "#ffffff".to_string(),
        }
    }

    fn stored() -> FieldConfiguration {
        FieldConfiguration {
            id: Uuid::new_v4(),
            sportsground_id: Uuid::new_v4(),
            template_id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            name: "Main pitch".to_string(),
            center_lat: -33.8688,
            center_lng: 151.2093,
            rotation: 30.0,
            length: 100.0,
            width: 64.0,
            line_color: "#ffffff".to_string(),
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_out_of_bounds_rejected_not_clamped() {
        let too_long = LayoutInput {
            length: 150.0,
            ..input()
        };
        let err = too_long.validate(&bounds()).unwrap_err();
        assert!(matches!(err, GeometryError::OutOfBounds { .. }));
    }

    #[test]
    fn test_invalid_color_and_anchor_rejected() {
        let bad_color = LayoutInput {
            line_color: "white".to_string(),
            ..input()
        };
        assert!(matches!(
            bad_color.validate(&bounds()),
            Err(GeometryError::InvalidColor(_))
        ));

        let polar = LayoutInput {
            center_lat: 89.0,
            ..input()
        };
        assert!(polar.validate(&bounds()).is_err());

        let nan_rotation = LayoutInput {
            rotation: f64::NAN,
            ..input()
        };
        assert_eq!(nan_rotation.validate(&bounds()), Err(GeometryError::NonFinite));
    }

    #[test]
    fn test_merged_layout_keeps_unchanged_fields() {
        let current = stored();
        let update = UpdateConfiguration {
            width: Some(70.0),
            ..Default::default()
        };
        let merged = update.merged_layout(&current);
        assert_eq!(merged.width, 70.0);
        assert_eq!(merged.length, 100.0);
        assert_eq!(merged.rotation, 30.0);
    }

    #[test]
    fn test_owner_transfer_requires_sportsground_owner() {
        let owner = Uuid::new_v4();
        assert!(check_owner_transfer(owner, owner).is_ok());
        assert!(matches!(
            check_owner_transfer(owner, Uuid::new_v4()),
            Err(ConfigurationError::OwnerMismatch)
        ));
    }

    #[test]
    fn test_stored_layout() {
        let layout = stored().layout().unwrap();
        assert_eq!(layout.length, 100.0);
        assert_eq!(layout.color.as_str(), "#ffffff");
    }
}
