//! Invitations
//!
//! An invitation carries a one-time token that creates an account with the
//! invitation's role (`POST /api/auth/accept-invitation`). Only a hash is
//! stored; the plaintext token is returned once, in the create response,
//! and is never logged.
//!
//! Creating or revoking an invitation requires the caller to be able to
//! grant its role, so only super admins deal with admin invitations.

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
    auth::{authorization, middleware::AuthContext},
    models::{
        invitation::{CreateInvitation, Invitation, InvitationKind, InvitationState},
        user::User,
    },
    pagination::{Page, PageParams},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Default, Deserialize)]
pub struct KindFilter {
    pub kind: Option<InvitationKind>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateInvitationRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    pub kind: InvitationKind,
}

/// Invitation with its derived lifecycle state
#[derive(Debug, Serialize)]
pub struct InvitationView {
    #[serde(flatten)]
    pub invitation: Invitation,
    pub state: InvitationState,
}

impl From<Invitation> for InvitationView {
    fn from(invitation: Invitation) -> Self {
        let state = invitation.state();
        Self { invitation, state }
    }
}

#[derive(Debug, Serialize)]
pub struct CreateInvitationResponse {
    pub invitation: InvitationView,
    /// Plaintext token; shown only here
    pub token: String,
}

pub async fn list_invitations(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
    Query(filter): Query<KindFilter>,
) -> ApiResult<Json<Page<InvitationView>>> {
    let pagination = params.resolve()?;

    let (items, total) = Invitation::list(&state.db, filter.kind, pagination).await?;

    Ok(Json(Page::new(items, pagination, total).map(InvitationView::from)))
}

/// Invite someone by email
///
/// # Errors
///
/// - `403 Forbidden`: Caller cannot grant the invitation's role
/// - `409 Conflict`: Account already exists, or a pending invitation does
pub async fn create_invitation(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidatedJson(req): ValidatedJson<CreateInvitationRequest>,
) -> ApiResult<(StatusCode, Json<CreateInvitationResponse>)> {
    authorization::require_can_grant(&auth, req.kind.granted_role())?;

    if User::find_by_email(&state.db, &req.email).await?.is_some() {
        return Err(ApiError::Conflict(
            "An account with this email already exists".to_string(),
        ));
    }
    if Invitation::has_pending(&state.db, &req.email).await? {
        return Err(ApiError::Conflict(
            "A pending invitation for this email already exists".to_string(),
        ));
    }

    let (invitation, token) = Invitation::create(
        &state.db,
        CreateInvitation {
            kind: req.kind,
            email: req.email,
            invited_by: auth.user_id,
            ttl: state.config.invitations.ttl(),
        },
    )
    .await?;

    tracing::info!(
        invitation_id = %invitation.id,
        role = %invitation.role,
        invited_by = %auth.user_id,
        expires_at = %invitation.expires_at,
        "Invitation created"
    );

    Ok((
        StatusCode::CREATED,
        Json(CreateInvitationResponse {
            invitation: invitation.into(),
            token,
        }),
    ))
}

/// Revoke a pending invitation
///
/// # Errors
///
/// - `404 Not Found`: Unknown invitation
/// - `403 Forbidden`: Caller cannot grant the invitation's role
/// - `409 Conflict`: Already accepted or revoked
pub async fn revoke_invitation(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let invitation = Invitation::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Invitation"))?;

    authorization::require_can_grant(&auth, invitation.role)?;

    if !Invitation::revoke(&state.db, invitation.id).await? {
        return Err(ApiError::Conflict(
            "Invitation has already been accepted or revoked".to_string(),
        ));
    }

    tracing::info!(invitation_id = %invitation.id, actor_id = %auth.user_id, "Invitation revoked");

    Ok(StatusCode::NO_CONTENT)
}
