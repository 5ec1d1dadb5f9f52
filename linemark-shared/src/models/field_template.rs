//! Field templates: per-sport dimension bounds and interior markings
//!
//! Markings are stored as JSONB in the shape understood by
//! [`linemark_editor::markings::MarkingElement`].

use chrono::{DateTime, Utc};
use linemark_editor::{DimensionBounds, GeometryError, MarkingElement, TemplateSpec};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct FieldTemplate {
    pub id: Uuid,
    pub name: String,
    pub sport: String,
    pub min_length: f64,
    pub max_length: f64,
    pub min_width: f64,
    pub max_width: f64,
    pub default_length: f64,
    pub default_width: f64,
    pub markings: Json<Vec<MarkingElement>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTemplate {
    pub name: String,
    pub sport: String,
    pub min_length: f64,
    pub max_length: f64,
    pub min_width: f64,
    pub max_width: f64,
    pub default_length: f64,
    pub default_width: f64,
    pub markings: Vec<MarkingElement>,
    pub is_active: bool,
}

impl CreateTemplate {
    /// Checks bounds and that the defaults fit inside them
    pub fn validate_geometry(&self) -> Result<TemplateSpec, GeometryError> {
        TemplateSpec::new(
            DimensionBounds::new(self.min_length, self.max_length, self.min_width, self.max_width)?,
            self.default_length,
            self.default_width,
            self.markings.clone(),
        )
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTemplate {
    pub name: Option<String>,
    pub sport: Option<String>,
    pub min_length: Option<f64>,
    pub max_length: Option<f64>,
    pub min_width: Option<f64>,
    pub max_width: Option<f64>,
    pub default_length: Option<f64>,
    pub default_width: Option<f64>,
    pub markings: Option<Vec<MarkingElement>>,
    pub is_active: Option<bool>,
}

impl UpdateTemplate {
    /// Merges the update over `current` so the combined geometry can be
    /// validated before anything is written
    pub fn apply_to(&self, current: &FieldTemplate) -> CreateTemplate {
        CreateTemplate {
            name: self.name.clone().unwrap_or_else(|| current.name.clone()),
            sport: self.sport.clone().unwrap_or_else(|| current.sport.clone()),
            min_length: self.min_length.unwrap_or(current.min_length),
            max_length: self.max_length.unwrap_or(current.max_length),
            min_width: self.min_width.unwrap_or(current.min_width),
            max_width: self.max_width.unwrap_or(current.max_width),
            default_length: self.default_length.unwrap_or(current.default_length),
            default_width: self.default_width.unwrap_or(current.default_width),
            markings: self
                .markings
                .clone()
                .unwrap_or_else(|| current.markings.0.clone()),
            is_active: self.is_active.unwrap_or(current.is_active),
        }
    }
}

const TEMPLATE_COLUMNS: &str = "id, name, sport, min_length, max_length, min_width, max_width, \
                                default_length, default_width, markings, is_active, \
                                created_at, updated_at";

impl FieldTemplate {
    pub fn bounds(&self) -> DimensionBounds {
        DimensionBounds {
            min_length: self.min_length,
            max_length: self.max_length,
            min_width: self.min_width,
            max_width: self.max_width,
        }
    }

    /// Editor view of this template
    pub fn spec(&self) -> Result<TemplateSpec, GeometryError> {
        TemplateSpec::new(
            self.bounds(),
            self.default_length,
            self.default_width,
            self.markings.0.clone(),
        )
    }

    pub async fn create(pool: &PgPool, data: CreateTemplate) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO field_templates
                (name, sport, min_length, max_length, min_width, max_width,
                 default_length, default_width, markings, is_active)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {TEMPLATE_COLUMNS}"
        );

        sqlx::query_as::<_, FieldTemplate>(&query)
            .bind(data.name)
            .bind(data.sport)
            .bind(data.min_length)
            .bind(data.max_length)
            .bind(data.min_width)
            .bind(data.max_width)
            .bind(data.default_length)
            .bind(data.default_width)
            .bind(Json(data.markings))
            .bind(data.is_active)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {TEMPLATE_COLUMNS} FROM field_templates WHERE id = $1");

        sqlx::query_as::<_, FieldTemplate>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Templates offered to users, by sport then name
    pub async fn list_active(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {TEMPLATE_COLUMNS} FROM field_templates
             WHERE is_active = TRUE
             ORDER BY sport ASC, name ASC"
        );

        sqlx::query_as::<_, FieldTemplate>(&query)
            .fetch_all(pool)
            .await
    }

    /// All templates including inactive ones
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!("SELECT {TEMPLATE_COLUMNS} FROM field_templates ORDER BY sport, name");

        sqlx::query_as::<_, FieldTemplate>(&query)
            .fetch_all(pool)
            .await
    }

    /// Overwrites every mutable column with an already-validated record
    pub async fn replace(
        pool: &PgPool,
        id: Uuid,
        data: CreateTemplate,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "UPDATE field_templates SET
                name = $2, sport = $3,
                min_length = $4, max_length = $5, min_width = $6, max_width = $7,
                default_length = $8, default_width = $9,
                markings = $10, is_active = $11
             WHERE id = $1
             RETURNING {TEMPLATE_COLUMNS}"
        );

        sqlx::query_as::<_, FieldTemplate>(&query)
            .bind(id)
            .bind(data.name)
            .bind(data.sport)
            .bind(data.min_length)
            .bind(data.max_length)
            .bind(data.min_width)
            .bind(data.max_width)
            .bind(data.default_length)
            .bind(data.default_width)
            .bind(Json(data.markings))
            .bind(data.is_active)
            .fetch_optional(pool)
            .await
    }
}
