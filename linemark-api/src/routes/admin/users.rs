//! Account administration
//!
//! Every change is checked against the authorization table for the
//! specific action, so a request that mixes allowed and forbidden changes
//! is rejected as a whole before anything is written.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::ValidatedJson,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use linemark_shared::{
    auth::{
        authorization::{authorize_account_action, AccountAction},
        middleware::AuthContext,
    },
    models::user::{UpdateUser, User, UserFilter, UserRole},
    pagination::{Page, PageParams},
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Default, Deserialize)]
pub struct RoleFilter {
    pub role: Option<UserRole>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AdminUpdateUserRequest {
    pub role: Option<UserRole>,
    pub is_suspended: Option<bool>,
    pub email_verified: Option<bool>,
}

impl AdminUpdateUserRequest {
    /// Requested actions, skipping values the account already has
    pub fn actions(&self, target: &User) -> Vec<AccountAction> {
        let mut actions = Vec::new();
        if let Some(role) = self.role.filter(|r| *r != target.role) {
            actions.push(AccountAction::ChangeRole(role));
        }
        if let Some(suspended) = self.is_suspended.filter(|s| *s != target.is_suspended) {
            actions.push(AccountAction::SetSuspended(suspended));
        }
        if let Some(verified) = self.email_verified.filter(|v| *v != target.email_verified) {
            actions.push(AccountAction::SetVerified(verified));
        }
        actions
    }
}

async fn find_user(state: &AppState, id: Uuid) -> ApiResult<User> {
    User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))
}

pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
    Query(filter): Query<RoleFilter>,
) -> ApiResult<Json<Page<User>>> {
    let pagination = params.resolve()?;
    let filter = UserFilter {
        search: params.search_pattern(),
        role: filter.role,
    };

    let (items, total) = User::list(&state.db, &filter, pagination).await?;

    Ok(Json(Page::new(items, pagination, total)))
}

/// Change role, suspension or verification of another account
///
/// # Errors
///
/// - `403 Forbidden`: Own account, target of equal or higher rank, or a
///   role the caller cannot grant
pub async fn update_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<AdminUpdateUserRequest>,
) -> ApiResult<Json<User>> {
    let target = find_user(&state, id).await?;

    let actions = req.actions(&target);
    if actions.is_empty() {
        return Ok(Json(target));
    }

    let mut update = UpdateUser::default();
    for action in &actions {
        authorize_account_action(&auth, target.id, target.role, *action)?;
        match *action {
            AccountAction::ChangeRole(role) => update.role = Some(role),
            AccountAction::SetSuspended(suspended) => update.is_suspended = Some(suspended),
            AccountAction::SetVerified(verified) => update.email_verified = Some(verified),
            AccountAction::Delete => {}
        }
    }

    let user = User::update(&state.db, target.id, update)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;

    tracing::info!(
        actor_id = %auth.user_id,
        target_id = %user.id,
        role = %user.role,
        suspended = user.is_suspended,
        verified = user.email_verified,
        "Account updated by admin"
    );

    Ok(Json(user))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let target = find_user(&state, id).await?;
    authorize_account_action(&auth, target.id, target.role, AccountAction::Delete)?;

    if !User::delete(&state.db, target.id).await? {
        return Err(ApiError::not_found("User"));
    }

    tracing::info!(actor_id = %auth.user_id, target_id = %target.id, "Account deleted by admin");

    Ok(StatusCode::NO_CONTENT)
}
