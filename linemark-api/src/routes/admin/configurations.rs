//! Configuration administration
//!
//! Same update rules as the owner endpoint, plus owner transfer. The new
//! owner must exist and already own the configuration's sportsground.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::{
        configurations::{apply_update, find_configuration, UpdateConfigurationRequest},
        ValidatedJson,
    },
};
use axum::{
    extract::{Path, State},
    Json,
};
use linemark_shared::models::{field_configuration::FieldConfiguration, user::User};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct AdminUpdateConfigurationRequest {
    pub owner_id: Option<Uuid>,

    #[serde(flatten)]
    #[validate(nested)]
    pub changes: UpdateConfigurationRequest,
}

pub async fn get_configuration(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<FieldConfiguration>> {
    Ok(Json(find_configuration(&state, id).await?))
}

pub async fn update_configuration(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<AdminUpdateConfigurationRequest>,
) -> ApiResult<Json<FieldConfiguration>> {
    let current = find_configuration(&state, id).await?;

    if let Some(owner_id) = req.owner_id {
        if User::find_by_id(&state.db, owner_id).await?.is_none() {
            return Err(ApiError::invalid("owner_id", "New owner does not exist"));
        }
    }

    let configuration = apply_update(&state, current, req.changes.into_update(req.owner_id)).await?;
    Ok(Json(configuration))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flattened_request() {
        let req: AdminUpdateConfigurationRequest = serde_json::from_str(
            r#"{"owner_id": "6f1c1d3e-2b7a-4c1e-9a55-0d2a4f3b9e10", "width": 64.0, "name": ""}"#,
        )
        .unwrap();

        assert!(req.owner_id.is_some());
        assert_eq!(req.changes.width, Some(64.0));

        match ApiError::from(req.validate().unwrap_err()) {
            ApiError::ValidationError(details) => {
                assert_eq!(details.len(), 1);
                assert_eq!(details[0].field, "name");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
