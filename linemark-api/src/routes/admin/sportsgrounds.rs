//! Sportsground administration
//!
//! Transferring a sportsground does not move its configurations. They are
//! handed over one by one through the configuration endpoint, which only
//! accepts the sportsground's current owner as the new owner.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::ValidatedJson,
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use linemark_shared::{
    auth::middleware::AuthContext,
    models::{
        sportsground::{Sportsground, SportsgroundSummary},
        user::User,
    },
    pagination::{Page, PageParams},
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct TransferSportsgroundRequest {
    pub owner_id: Uuid,
}

/// Every sportsground, newest first; `q` matches name, address or owner email
pub async fn list_sportsgrounds(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> ApiResult<Json<Page<SportsgroundSummary>>> {
    let pagination = params.resolve()?;
    let search = params.search_pattern();

    let (items, total) = Sportsground::list_all(&state.db, search.as_deref(), pagination).await?;

    Ok(Json(Page::new(items, pagination, total)))
}

/// Give a sportsground to another user
///
/// # Errors
///
/// - `404 Not Found`: Unknown sportsground
/// - `422 Unprocessable Entity`: New owner does not exist
pub async fn transfer_sportsground(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<TransferSportsgroundRequest>,
) -> ApiResult<Json<Sportsground>> {
    let current = Sportsground::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Sportsground"))?;

    if current.owner_id == req.owner_id {
        return Ok(Json(current));
    }
    if User::find_by_id(&state.db, req.owner_id).await?.is_none() {
        return Err(ApiError::invalid("owner_id", "New owner does not exist"));
    }

    let sportsground = Sportsground::transfer_owner(&state.db, id, req.owner_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Sportsground"))?;

    tracing::info!(
        sportsground_id = %sportsground.id,
        from = %current.owner_id,
        to = %sportsground.owner_id,
        actor_id = %auth.user_id,
        "Sportsground transferred"
    );

    Ok(Json(sportsground))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_request_requires_owner() {
        let req: TransferSportsgroundRequest =
            serde_json::from_str(r#"{"owner_id": "6f1c1d3e-2b7a-4c1e-9a55-0d2a4f3b9e10"}"#).unwrap();
        assert!(req.validate().is_ok());

        assert!(serde_json::from_str::<TransferSportsgroundRequest>("{}").is_err());
        assert!(serde_json::from_str::<TransferSportsgroundRequest>(r#"{"owner_id": "nope"}"#).is_err());
    }
}
