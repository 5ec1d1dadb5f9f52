//! Authentication endpoints
//!
//! # Endpoints
//!
//! - `POST /api/auth/register` - Register a new user
//! - `POST /api/auth/login` - Login and get tokens
//! - `POST /api/auth/refresh` - Exchange a refresh token for a new pair
//! - `POST /api/auth/accept-invitation` - Create an account from an invitation
//! - `GET /api/auth/me` - The authenticated account

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::{non_blank, ValidatedJson},
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use linemark_shared::{
    auth::{
        jwt::{self, TokenPair},
        middleware::AuthContext,
        password, token,
    },
    models::{
        invitation::{Invitation, InvitationState},
        user::{CreateUser, User, UserRole},
    },
};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Strength is checked separately
    pub password: String,

    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AcceptInvitationRequest {
    #[validate(length(min = 1, message = "Invitation token is required"))]
    pub token: String,

    pub password: String,

    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: Option<String>,
}

/// Account plus a fresh token pair
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: User,
    #[serde(flatten)]
    pub tokens: TokenPair,
}

pub(crate) fn check_password_strength(field: &str, candidate: &str) -> ApiResult<()> {
    password::validate_password_strength(candidate).map_err(|message| ApiError::invalid(field, message))
}

fn respond(user: User, secret: &str) -> ApiResult<Json<AuthResponse>> {
    let tokens = jwt::issue_token_pair(user.id, user.role, secret)?;
    Ok(Json(AuthResponse { user, tokens }))
}

/// Register a new user
///
/// ```text
/// POST /api/auth/register
///
/// { "email": "groundsman@example.com", "password": "pitch-lines-2025", "name": "Pat" }
/// ```
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Validation failed or password too weak
/// - `409 Conflict`: Email already exists
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    check_password_strength("password", &req.password)?;

    if User::find_by_email(&state.db, &req.email).await?.is_some() {
        return Err(ApiError::Conflict("Email already exists".to_string()));
    }

    let password_hash = password::hash_password(&req.password)?;
    let user = User::create(
        &state.db,
        CreateUser {
            email: req.email,
            password_hash,
            name: non_blank(req.name),
            role: UserRole::User,
            email_verified: false,
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, "User registered");

    let Json(body) = respond(user, state.jwt_secret())?;
    Ok((StatusCode::CREATED, Json(body)))
}

/// Login with email and password
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown email or wrong password (indistinguishable)
/// - `403 Forbidden`: Account suspended
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let invalid = || ApiError::Unauthorized("Invalid email or password".to_string());

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(invalid)?;

    if !password::verify_password(&req.password, &user.password_hash)? {
        tracing::debug!(user_id = %user.id, "Login rejected: wrong password");
        return Err(invalid());
    }

    if user.is_suspended {
        return Err(ApiError::Forbidden("Account is suspended".to_string()));
    }

    User::update_last_login(&state.db, user.id).await?;

    respond(user, state.jwt_secret())
}

/// Exchange a refresh token for a new token pair
///
/// The account is reloaded so the new access token carries the current
/// role, and suspended or deleted accounts cannot refresh.
pub async fn refresh(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RefreshRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let claims = jwt::validate_refresh_token(&req.refresh_token, state.jwt_secret())?;

    let user = User::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Account no longer exists".to_string()))?;

    if user.is_suspended {
        return Err(ApiError::Forbidden("Account is suspended".to_string()));
    }

    respond(user, state.jwt_secret())
}

/// Create an account from an invitation token
///
/// The account gets the invitation's role and a verified email. User
/// creation and marking the invitation accepted share one transaction, so
/// a token can only ever be redeemed once.
///
/// # Errors
///
/// - `404 Not Found`: Unknown token
/// - `409 Conflict`: Invitation used, revoked or expired, or the email is taken
pub async fn accept_invitation(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<AcceptInvitationRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    if !token::validate_token_format(&req.token) {
        return Err(ApiError::invalid("token", "Malformed invitation token"));
    }
    check_password_strength("password", &req.password)?;

    let invitation = Invitation::find_by_token(&state.db, &req.token)
        .await?
        .ok_or_else(|| ApiError::not_found("Invitation"))?;

    match invitation.state() {
        InvitationState::Pending => {}
        InvitationState::Accepted => {
            return Err(ApiError::Conflict("Invitation has already been used".to_string()))
        }
        InvitationState::Revoked => {
            return Err(ApiError::Conflict("Invitation has been revoked".to_string()))
        }
        InvitationState::Expired => {
            return Err(ApiError::Conflict("Invitation has expired".to_string()))
        }
    }

    let password_hash = password::hash_password(&req.password)?;

    let mut tx = state.db.begin().await?;

    if !Invitation::mark_accepted(&mut *tx, invitation.id).await? {
        return Err(ApiError::Conflict(
            "Invitation is no longer valid".to_string(),
        ));
    }

    let user = User::create(
        &mut *tx,
        CreateUser {
            email: invitation.email.clone(),
            password_hash,
            name: non_blank(req.name),
            role: invitation.role,
            email_verified: true,
        },
    )
    .await?;

    tx.commit().await?;

    tracing::info!(
        user_id = %user.id,
        invitation_id = %invitation.id,
        role = %user.role,
        "Invitation accepted"
    );

    let Json(body) = respond(user, state.jwt_secret())?;
    Ok((StatusCode::CREATED, Json(body)))
}

/// The authenticated account
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<User>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;

    Ok(Json(user))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_validation() {
        let req = RegisterRequest {
            email: "not-an-email".to_string(),
            password: "pitch-lines-2025".to_string(),
            name: Some("x".repeat(101)),
        };
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("name"));
    }

    #[test]
    fn test_weak_password_names_field() {
        match check_password_strength("new_password", "short") {
            Err(ApiError::ValidationError(details)) => {
                assert_eq!(details[0].field, "new_password")
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(check_password_strength("password", "pitch-lines-2025").is_ok());
    }
}
