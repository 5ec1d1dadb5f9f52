//! Template administration
//!
//! Bounds, defaults and markings are validated as a whole with the editor's
//! template rules before anything is written. Updates are merged over the
//! stored template first, so changing one bound re-checks the defaults.
//! Existing configurations are not re-validated when bounds change.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::ValidatedJson,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use linemark_editor::MarkingElement;
use linemark_shared::{
    auth::middleware::AuthContext,
    models::field_template::{CreateTemplate, FieldTemplate, UpdateTemplate},
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTemplateRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(length(min = 1, max = 50, message = "Sport must be 1-50 characters"))]
    pub sport: String,

    pub min_length: f64,
    pub max_length: f64,
    pub min_width: f64,
    pub max_width: f64,
    pub default_length: f64,
    pub default_width: f64,

    #[serde(default)]
    pub markings: Vec<MarkingElement>,

    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTemplateRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    #[validate(length(min = 1, max = 50, message = "Sport must be 1-50 characters"))]
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

impl From<CreateTemplateRequest> for CreateTemplate {
    fn from(req: CreateTemplateRequest) -> Self {
        CreateTemplate {
            name: req.name.trim().to_string(),
            sport: req.sport.trim().to_lowercase(),
            min_length: req.min_length,
            max_length: req.max_length,
            min_width: req.min_width,
            max_width: req.max_width,
            default_length: req.default_length,
            default_width: req.default_width,
            markings: req.markings,
            is_active: req.is_active,
        }
    }
}

impl From<UpdateTemplateRequest> for UpdateTemplate {
    fn from(req: UpdateTemplateRequest) -> Self {
        UpdateTemplate {
            name: req.name.map(|n| n.trim().to_string()),
            sport: req.sport.map(|s| s.trim().to_lowercase()),
            min_length: req.min_length,
            max_length: req.max_length,
            min_width: req.min_width,
            max_width: req.max_width,
            default_length: req.default_length,
            default_width: req.default_width,
            markings: req.markings,
            is_active: req.is_active,
        }
    }
}

pub async fn list_templates(State(state): State<AppState>) -> ApiResult<Json<Vec<FieldTemplate>>> {
    Ok(Json(FieldTemplate::list_all(&state.db).await?))
}

/// Create a template
///
/// # Errors
///
/// - `422 Unprocessable Entity`: min > max, non-positive bounds, or defaults
///   outside the bounds
/// - `409 Conflict`: Template name already taken
pub async fn create_template(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidatedJson(req): ValidatedJson<CreateTemplateRequest>,
) -> ApiResult<(StatusCode, Json<FieldTemplate>)> {
    let data = CreateTemplate::from(req);
    data.validate_geometry()?;

    let template = FieldTemplate::create(&state.db, data).await?;

    tracing::info!(
        template_id = %template.id,
        name = %template.name,
        actor_id = %auth.user_id,
        "Template created"
    );

    Ok((StatusCode::CREATED, Json(template)))
}

pub async fn update_template(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdateTemplateRequest>,
) -> ApiResult<Json<FieldTemplate>> {
    let current = FieldTemplate::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Template"))?;

    let merged = UpdateTemplate::from(req).apply_to(&current);
    merged.validate_geometry()?;

    let template = FieldTemplate::replace(&state.db, id, merged)
        .await?
        .ok_or_else(|| ApiError::not_found("Template"))?;

    tracing::info!(
        template_id = %template.id,
        active = template.is_active,
        actor_id = %auth.user_id,
        "Template updated"
    );

    Ok(Json(template))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json: &str) -> CreateTemplateRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_create_request_normalizes() {
        let req = request(
            r#"{"name": " Rugby league ", "sport": "Rugby", "min_length": 90, "max_length": 100,
                "min_width": 64, "max_width": 68, "default_length": 100, "default_width": 68}"#,
        );
        assert!(req.validate().is_ok());

        let data = CreateTemplate::from(req);
        assert_eq!(data.name, "Rugby league");
        assert_eq!(data.sport, "rugby");
        assert!(data.is_active);
        assert!(data.markings.is_empty());
        assert!(data.validate_geometry().is_ok());
    }

    #[test]
    fn test_defaults_outside_bounds_rejected() {
        let data = CreateTemplate::from(request(
            r#"{"name": "Odd", "sport": "soccer", "min_length": 90, "max_length": 120,
                "min_width": 45, "max_width": 90, "default_length": 130, "default_width": 60}"#,
        ));

        let err: ApiError = data.validate_geometry().unwrap_err().into();
        match err {
            ApiError::ValidationError(details) => assert_eq!(details[0].field, "length"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
