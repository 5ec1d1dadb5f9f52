//! The caller's own account
//!
//! # Endpoints
//!
//! - `GET /api/users/me` - Profile
//! - `PATCH /api/users/me` - Update name or email
//! - `POST /api/users/me/password` - Change password

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::{auth::check_password_strength, non_blank, nullable, ValidatedJson},
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use linemark_shared::{
    auth::{middleware::AuthContext, password},
    models::user::{UpdateUser, User},
};
use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    /// `null` clears the name
    #[serde(default, deserialize_with = "nullable")]
    pub name: Option<Option<String>>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,

    pub new_password: String,
}

async fn load_self(state: &AppState, auth: &AuthContext) -> ApiResult<User> {
    User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))
}

pub async fn get_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<User>> {
    Ok(Json(load_self(&state, &auth).await?))
}

/// Update the caller's name or email
///
/// Changing the email clears `email_verified`.
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Invalid email or name too long
/// - `409 Conflict`: Email belongs to another account
pub async fn update_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidatedJson(req): ValidatedJson<UpdateProfileRequest>,
) -> ApiResult<Json<User>> {
    let current = load_self(&state, &auth).await?;

    let mut update = UpdateUser::default();

    if let Some(name) = req.name {
        let name = non_blank(name);
        if name.as_ref().is_some_and(|n| n.chars().count() > 100) {
            return Err(ApiError::invalid("name", "Name must be at most 100 characters"));
        }
        update.name = Some(name);
    }

    if let Some(email) = req.email {
        if !email.trim().eq_ignore_ascii_case(&current.email) {
            if let Some(other) = User::find_by_email(&state.db, &email).await? {
                if other.id != current.id {
                    return Err(ApiError::Conflict("Email already exists".to_string()));
                }
            }
            update.email = Some(email);
            update.email_verified = Some(false);
        }
    }

    if update.is_empty() {
        return Ok(Json(current));
    }

    let user = User::update(&state.db, current.id, update)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;

    tracing::info!(user_id = %user.id, "Profile updated");

    Ok(Json(user))
}

/// Change the caller's password
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Current password wrong or new password too weak
pub async fn change_password(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidatedJson(req): ValidatedJson<ChangePasswordRequest>,
) -> ApiResult<StatusCode> {
    let user = load_self(&state, &auth).await?;

    if !password::verify_password(&req.current_password, &user.password_hash)? {
        return Err(ApiError::invalid(
            "current_password",
            "Current password is incorrect",
        ));
    }
    check_password_strength("new_password", &req.new_password)?;

    let password_hash = password::hash_password(&req.new_password)?;
    User::update(
        &state.db,
        user.id,
        UpdateUser {
            password_hash: Some(password_hash),
            ..Default::default()
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, "Password changed");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_request_parsing() {
        let req: UpdateProfileRequest =
            serde_json::from_str(r#"{"name": null, "email": "bad"}"#).unwrap();
        assert_eq!(req.name, Some(None));
        assert!(req.validate().is_err());

        let req: UpdateProfileRequest = serde_json::from_str(r#"{}"#).unwrap();
        assert!(req.name.is_none() && req.email.is_none());
        assert!(req.validate().is_ok());
    }
}
