//! Field configuration endpoints
//!
//! # Endpoints
//!
//! - `GET /api/configurations` - The caller's configurations (`sportsground_id`, `q`, paging)
//! - `POST /api/configurations` - Place a field on a sportsground
//! - `GET /api/configurations/:id` - Get one (owner or admin)
//! - `PATCH /api/configurations/:id` - Update name, template, geometry or notes
//! - `DELETE /api/configurations/:id` - Delete with its bookings
//! - `GET /api/configurations/:id/geometry` - Rendered outline, markings and GeoJSON
//!
//! Dimensions are checked strictly against the template bounds: out-of-range
//! values are a 422, never silently clamped.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::{non_blank, nullable, sportsgrounds, ValidatedJson},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use linemark_editor::{LineColor, RenderedLayout};
use linemark_shared::{
    auth::{authorization, middleware::AuthContext},
    models::{
        field_configuration::{
            check_owner_transfer, ConfigurationError, CreateConfiguration, FieldConfiguration,
            LayoutInput, UpdateConfiguration,
        },
        field_template::FieldTemplate,
        sportsground::Sportsground,
    },
    pagination::{Page, PageParams},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateConfigurationRequest {
    pub sportsground_id: Uuid,
    pub template_id: Uuid,

    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,

    pub center_lat: f64,
    pub center_lng: f64,

    /// Degrees clockwise; normalized to [0, 360)
    #[serde(default)]
    pub rotation: f64,

    /// Defaults to the template's default length
    pub length: Option<f64>,
    /// Defaults to the template's default width
    pub width: Option<f64>,
    /// `#rrggbb`, defaults to white
    pub line_color: Option<String>,

    #[validate(length(max = 2000, message = "Notes must be at most 2000 characters"))]
    pub notes: Option<String>,
}

/// Owner-facing partial update; admins can also transfer ownership through
/// `/api/admin/configurations/:id`
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateConfigurationRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: Option<String>,

    pub template_id: Option<Uuid>,
    pub center_lat: Option<f64>,
    pub center_lng: Option<f64>,
    pub rotation: Option<f64>,
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub line_color: Option<String>,

    /// `null` clears the notes
    #[serde(default, deserialize_with = "nullable")]
    pub notes: Option<Option<String>>,
}

impl UpdateConfigurationRequest {
    pub fn into_update(self, owner_id: Option<Uuid>) -> UpdateConfiguration {
        UpdateConfiguration {
            name: self.name,
            template_id: self.template_id,
            owner_id,
            center_lat: self.center_lat,
            center_lng: self.center_lng,
            rotation: self.rotation,
            length: self.length,
            width: self.width,
            line_color: self.line_color,
            notes: self.notes,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ConfigurationFilter {
    pub sportsground_id: Option<Uuid>,
}

/// Map-ready geometry for one configuration
#[derive(Debug, Serialize)]
pub struct GeometryResponse {
    pub configuration_id: Uuid,
    pub template_id: Uuid,
    pub layout: RenderedLayout,
    pub geojson: serde_json::Value,
}

pub(crate) async fn find_configuration(
    state: &AppState,
    id: Uuid,
) -> ApiResult<FieldConfiguration> {
    FieldConfiguration::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Configuration"))
}

async fn load_authorized(
    state: &AppState,
    auth: &AuthContext,
    id: Uuid,
) -> ApiResult<FieldConfiguration> {
    let configuration = find_configuration(state, id).await?;
    authorization::require_owner_or_admin(auth, configuration.owner_id)?;
    Ok(configuration)
}

async fn find_template(state: &AppState, id: Uuid) -> ApiResult<FieldTemplate> {
    FieldTemplate::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::invalid("template_id", "Template does not exist"))
}

fn trimmed_name(name: &str) -> ApiResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ApiError::invalid("name", "Name is required"));
    }
    Ok(name.to_string())
}

/// Merges, validates and writes an update
///
/// A changed template must be active; the merged dimensions are checked
/// against whichever template the record ends up on. An owner change must
/// satisfy [`check_owner_transfer`].
pub(crate) async fn apply_update(
    state: &AppState,
    current: FieldConfiguration,
    update: UpdateConfiguration,
) -> ApiResult<FieldConfiguration> {
    let template_id = update.template_id.unwrap_or(current.template_id);
    let template = find_template(state, template_id).await?;
    if template_id != current.template_id && !template.is_active {
        return Err(ConfigurationError::InactiveTemplate.into());
    }

    let owner_id = match update.owner_id {
        Some(new_owner) if new_owner != current.owner_id => {
            let sportsground = Sportsground::find_by_id(&state.db, current.sportsground_id)
                .await?
                .ok_or_else(|| ApiError::not_found("Sportsground"))?;
            check_owner_transfer(new_owner, sportsground.owner_id)?;
            new_owner
        }
        _ => current.owner_id,
    };

    let layout = update.merged_layout(&current).validate(&template.bounds())?;

    let name = match &update.name {
        Some(name) => trimmed_name(name)?,
        None => current.name.clone(),
    };
    let notes = match update.notes {
        Some(notes) => non_blank(notes),
        None => current.notes.clone(),
    };

    let configuration = FieldConfiguration::replace(
        &state.db,
        current.id,
        owner_id,
        template_id,
        name,
        &layout,
        notes,
    )
    .await?
    .ok_or_else(|| ApiError::not_found("Configuration"))?;

    if owner_id != current.owner_id {
        tracing::info!(
            configuration_id = %configuration.id,
            from_owner = %current.owner_id,
            to_owner = %owner_id,
            "Configuration ownership transferred"
        );
    }

    Ok(configuration)
}

pub async fn list_configurations(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(params): Query<PageParams>,
    Query(filter): Query<ConfigurationFilter>,
) -> ApiResult<Json<Page<FieldConfiguration>>> {
    let pagination = params.resolve()?;
    let search = params.search_pattern();

    let (items, total) = FieldConfiguration::list_by_owner(
        &state.db,
        auth.user_id,
        filter.sportsground_id,
        search.as_deref(),
        pagination,
    )
    .await?;

    Ok(Json(Page::new(items, pagination, total)))
}

/// Place a field on a sportsground
///
/// The configuration belongs to the sportsground's owner, also when an
/// admin creates it.
///
/// # Errors
///
/// - `404 Not Found`: Sportsground does not exist
/// - `403 Forbidden`: Caller neither owns the sportsground nor is an admin
/// - `422 Unprocessable Entity`: Inactive template, bad anchor or color, or
///   dimensions outside the template bounds
pub async fn create_configuration(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidatedJson(req): ValidatedJson<CreateConfigurationRequest>,
) -> ApiResult<(StatusCode, Json<FieldConfiguration>)> {
    let sportsground = sportsgrounds::load_authorized(&state, &auth, req.sportsground_id).await?;

    let template = find_template(&state, req.template_id).await?;
    if !template.is_active {
        return Err(ConfigurationError::InactiveTemplate.into());
    }

    let name = trimmed_name(&req.name)?;
    let layout = LayoutInput {
        center_lat: req.center_lat,
        center_lng: req.center_lng,
        rotation: req.rotation,
        length: req.length.unwrap_or(template.default_length),
        width: req.width.unwrap_or(template.default_width),
        line_color: req
            .line_color
            .unwrap_or_else(|| LineColor::default().to_string()),
    }
    .validate(&template.bounds())?;

    let configuration = FieldConfiguration::create(
        &state.db,
        CreateConfiguration {
            sportsground_id: sportsground.id,
            template_id: template.id,
            owner_id: sportsground.owner_id,
            name,
            layout,
            notes: non_blank(req.notes),
        },
    )
    .await?;

    tracing::info!(
        configuration_id = %configuration.id,
        sportsground_id = %sportsground.id,
        template = %template.name,
        "Configuration created"
    );

    Ok((StatusCode::CREATED, Json(configuration)))
}

pub async fn get_configuration(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<FieldConfiguration>> {
    Ok(Json(load_authorized(&state, &auth, id).await?))
}

pub async fn update_configuration(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdateConfigurationRequest>,
) -> ApiResult<Json<FieldConfiguration>> {
    let current = load_authorized(&state, &auth, id).await?;
    let configuration = apply_update(&state, current, req.into_update(None)).await?;
    Ok(Json(configuration))
}

pub async fn delete_configuration(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    load_authorized(&state, &auth, id).await?;

    if !FieldConfiguration::delete(&state.db, id).await? {
        return Err(ApiError::not_found("Configuration"));
    }

    tracing::info!(configuration_id = %id, actor_id = %auth.user_id, "Configuration deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Rendered outline, interior markings and handle markers, plus the same
/// geometry as a GeoJSON `FeatureCollection`
pub async fn get_geometry(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<GeometryResponse>> {
    let configuration = load_authorized(&state, &auth, id).await?;
    let template = FieldTemplate::find_by_id(&state.db, configuration.template_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Template"))?;

    let layout = configuration.layout()?.render(&template.markings.0);
    let geojson = layout.to_geojson();

    Ok(Json(GeometryResponse {
        configuration_id: configuration.id,
        template_id: template.id,
        layout,
        geojson,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_defaults() {
        let req: CreateConfigurationRequest = serde_json::from_str(
            r#"{
                "sportsground_id": "6f1c1d3e-2b7a-4c1e-9a55-0d2a4f3b9e10",
                "template_id": "0b3f7c2a-8d41-4e6b-b1f9-5c7e2d9a0f33",
                "name": "Main pitch",
                "center_lat": -33.8688,
                "center_lng": 151.2093
            }"#,
        )
        .unwrap();

        assert_eq!(req.rotation, 0.0);
        assert!(req.length.is_none() && req.width.is_none() && req.line_color.is_none());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_update_request_maps_to_model_update() {
        let req: UpdateConfigurationRequest =
            serde_json::from_str(r#"{"length": 100.0, "notes": null}"#).unwrap();
        let owner = Uuid::new_v4();
        let update = req.into_update(Some(owner));

        assert_eq!(update.length, Some(100.0));
        assert_eq!(update.notes, Some(None));
        assert_eq!(update.owner_id, Some(owner));
        assert!(update.template_id.is_none());
    }

    #[test]
    fn test_trimmed_name() {
        assert_eq!(trimmed_name("  Main pitch ").unwrap(), "Main pitch");
        assert!(trimmed_name("   ").is_err());
    }
}
