//! Sportsground endpoints
//!
//! # Endpoints
//!
//! - `GET /api/sportsgrounds` - The caller's sportsgrounds (`page`, `limit`, `q`)
//! - `POST /api/sportsgrounds` - Create a sportsground
//! - `GET /api/sportsgrounds/:id` - Get one (owner or admin)
//! - `PATCH /api/sportsgrounds/:id` - Update (owner or admin)
//! - `DELETE /api/sportsgrounds/:id` - Delete with its configurations and bookings

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::{non_blank, nullable, ValidatedJson},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use linemark_shared::{
    auth::{authorization, middleware::AuthContext},
    models::sportsground::{
        CreateSportsground, Sportsground, UpdateSportsground, DEFAULT_ZOOM,
    },
    pagination::{Page, PageParams},
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSportsgroundRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,

    #[validate(length(max = 500, message = "Address must be at most 500 characters"))]
    pub address: Option<String>,

    #[validate(range(min = -85.0, max = 85.0, message = "Latitude must be within ±85"))]
    pub center_lat: f64,

    #[validate(range(min = -180.0, max = 180.0, message = "Longitude must be within ±180"))]
    pub center_lng: f64,

    #[validate(range(min = 1, max = 22, message = "Zoom must be between 1 and 22"))]
    pub default_zoom: Option<i16>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSportsgroundRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: Option<String>,

    /// `null` clears the address
    #[serde(default, deserialize_with = "nullable")]
    pub address: Option<Option<String>>,

    #[validate(range(min = -85.0, max = 85.0, message = "Latitude must be within ±85"))]
    pub center_lat: Option<f64>,

    #[validate(range(min = -180.0, max = 180.0, message = "Longitude must be within ±180"))]
    pub center_lng: Option<f64>,

    #[validate(range(min = 1, max = 22, message = "Zoom must be between 1 and 22"))]
    pub default_zoom: Option<i16>,
}

/// Loads a sportsground the caller owns, or any sportsground for an admin
pub(crate) async fn load_authorized(
    state: &AppState,
    auth: &AuthContext,
    id: Uuid,
) -> ApiResult<Sportsground> {
    let sportsground = Sportsground::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Sportsground"))?;

    authorization::require_owner_or_admin(auth, sportsground.owner_id)?;
    Ok(sportsground)
}

pub async fn list_sportsgrounds(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(params): Query<PageParams>,
) -> ApiResult<Json<Page<Sportsground>>> {
    let pagination = params.resolve()?;
    let search = params.search_pattern();

    let (items, total) =
        Sportsground::list_by_owner(&state.db, auth.user_id, search.as_deref(), pagination).await?;

    Ok(Json(Page::new(items, pagination, total)))
}

/// Create a sportsground owned by the caller
///
/// ```text
/// POST /api/sportsgrounds
///
/// { "name": "Victoria Park", "center_lat": -33.8688, "center_lng": 151.2093 }
/// ```
pub async fn create_sportsground(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidatedJson(req): ValidatedJson<CreateSportsgroundRequest>,
) -> ApiResult<(StatusCode, Json<Sportsground>)> {
    let name = req.name.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::invalid("name", "Name is required"));
    }

    let sportsground = Sportsground::create(
        &state.db,
        CreateSportsground {
            owner_id: auth.user_id,
            name,
            address: non_blank(req.address),
            center_lat: req.center_lat,
            center_lng: req.center_lng,
            default_zoom: req.default_zoom.unwrap_or(DEFAULT_ZOOM),
        },
    )
    .await?;

    tracing::info!(
        sportsground_id = %sportsground.id,
        owner_id = %auth.user_id,
        "Sportsground created"
    );

    Ok((StatusCode::CREATED, Json(sportsground)))
}

pub async fn get_sportsground(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Sportsground>> {
    Ok(Json(load_authorized(&state, &auth, id).await?))
}

pub async fn update_sportsground(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdateSportsgroundRequest>,
) -> ApiResult<Json<Sportsground>> {
    load_authorized(&state, &auth, id).await?;

    let name = match req.name {
        Some(name) => {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(ApiError::invalid("name", "Name is required"));
            }
            Some(name)
        }
        None => None,
    };

    let sportsground = Sportsground::update(
        &state.db,
        id,
        UpdateSportsground {
            name,
            address: req.address.map(non_blank),
            center_lat: req.center_lat,
            center_lng: req.center_lng,
            default_zoom: req.default_zoom,
        },
    )
    .await?
    .ok_or_else(|| ApiError::not_found("Sportsground"))?;

    Ok(Json(sportsground))
}

/// Delete a sportsground
///
/// Its configurations and their bookings go with it.
pub async fn delete_sportsground(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    load_authorized(&state, &auth, id).await?;

    if !Sportsground::delete(&state.db, id).await? {
        return Err(ApiError::not_found("Sportsground"));
    }

    tracing::info!(sportsground_id = %id, actor_id = %auth.user_id, "Sportsground deleted");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_ranges() {
        let req: CreateSportsgroundRequest = serde_json::from_str(
            r#"{"name": "Victoria Park", "center_lat": -33.8688, "center_lng": 151.2093}"#,
        )
        .unwrap();
        assert!(req.validate().is_ok());

        let req: CreateSportsgroundRequest = serde_json::from_str(
            r#"{"name": "", "center_lat": 86.0, "center_lng": 181.0, "default_zoom": 23}"#,
        )
        .unwrap();
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        for field in ["name", "center_lat", "center_lng", "default_zoom"] {
            assert!(fields.contains_key(field), "missing error for {field}");
        }
    }

    #[test]
    fn test_update_request_is_partial() {
        let req: UpdateSportsgroundRequest =
            serde_json::from_str(r#"{"address": null, "default_zoom": 17}"#).unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(req.address, Some(None));
        assert!(req.name.is_none());
    }
}
