//! Field template endpoints
//!
//! Users only see active templates; admins can also fetch inactive ones by
//! id. Template management lives under `/api/admin/templates`.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use linemark_shared::{auth::middleware::AuthContext, models::field_template::FieldTemplate};
use uuid::Uuid;

pub async fn list_templates(State(state): State<AppState>) -> ApiResult<Json<Vec<FieldTemplate>>> {
    Ok(Json(FieldTemplate::list_active(&state.db).await?))
}

pub async fn get_template(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<FieldTemplate>> {
    let template = FieldTemplate::find_by_id(&state.db, id)
        .await?
        .filter(|t| t.is_active || auth.role.is_admin())
        .ok_or_else(|| ApiError::not_found("Template"))?;

    Ok(Json(template))
}
