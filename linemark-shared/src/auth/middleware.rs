//! Bearer-token authentication middleware
//!
//! Validates the access token, then reloads the account so that role
//! changes, suspensions and deletions apply to tokens already issued. On
//! success an [`AuthContext`] is inserted into the request extensions.
//!
//! # Example
//!
//! ```no_run
//! use axum::{routing::get, Extension, Router};
//! use linemark_shared::auth::middleware::{jwt_auth_middleware, AuthContext, AuthState};
//! use sqlx::PgPool;
//!
//! async fn me(Extension(auth): Extension<AuthContext>) -> String {
//!     auth.email
//! }
//!
//! # fn example(pool: PgPool) {
//! let auth = AuthState {
//!     pool,
//!     secret: "a-development-secret-of-32-bytes!".into(),
//! };
//! let app: Router = Router::new()
//!     .route("/me", get(me))
//!     .layer(axum::middleware::from_fn_with_state(auth, jwt_auth_middleware));
//! # }
//! ```

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use super::jwt::{validate_access_token, JwtError};
use crate::models::user::{User, UserRole};

/// The authenticated account for the current request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub email: String,
    /// Current role, read from the database on this request
    pub role: UserRole,
}

impl AuthContext {
    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: user.id,
            email: user.email.clone(),
            role: user.role,
        }
    }
}

/// State needed by the middleware
#[derive(Clone)]
pub struct AuthState {
    pub pool: PgPool,
    pub secret: Arc<str>,
}

#[derive(Debug)]
pub enum AuthError {
    MissingCredentials,
    InvalidFormat(String),
    InvalidToken(String),
    AccountUnavailable,
    Suspended,
    DatabaseError(String),
}

impl AuthError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AuthError::MissingCredentials => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Missing authorization header".to_string(),
            ),
            AuthError::InvalidFormat(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            AuthError::InvalidToken(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg.clone()),
            AuthError::AccountUnavailable => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Account no longer exists".to_string(),
            ),
            AuthError::Suspended => (
                StatusCode::FORBIDDEN,
                "forbidden",
                "Account is suspended".to_string(),
            ),
            AuthError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "An internal error occurred".to_string(),
            ),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if let AuthError::DatabaseError(msg) = &self {
            tracing::error!(error = %msg, "Database error during authentication");
        }
        let (status, code, message) = self.parts();
        (status, Json(json!({ "error": code, "message": message }))).into_response()
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header value
pub fn bearer_token(header_value: &str) -> Result<&str, AuthError> {
    let token = header_value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?
        .trim();

    if token.is_empty() {
        return Err(AuthError::MissingCredentials);
    }
    Ok(token)
}

pub async fn jwt_auth_middleware(
    State(auth): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    let token = bearer_token(header_value)?;

    let claims = validate_access_token(token, &auth.secret).map_err(|e| match e {
        JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
        JwtError::InvalidIssuer => AuthError::InvalidToken("Invalid issuer".to_string()),
        other => AuthError::InvalidToken(format!("Invalid token: {}", other)),
    })?;

    let user = User::find_by_id(&auth.pool, claims.sub)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?
        .ok_or(AuthError::AccountUnavailable)?;

    if user.is_suspended {
        tracing::debug!(user_id = %user.id, "Rejected request from suspended account");
        return Err(AuthError::Suspended);
    }

    req.extensions_mut().insert(AuthContext::from_user(&user));

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token("Bearer abc.def.ghi").unwrap(), "abc.def.ghi");
        assert!(matches!(
            bearer_token("Basic dXNlcjpwYXNz"),
            Err(AuthError::InvalidFormat(_))
        ));
        assert!(matches!(
            bearer_token("Bearer   "),
            Err(AuthError::MissingCredentials)
        ));
    }

    #[test]
    fn test_context_from_user() {
        let user = User {
            id: Uuid::new_v4(),
            email: "pat@example.com".to_string(),
            password_hash: String::new(),
            name: None,
            role: UserRole::Admin,
            email_verified: true,
            is_suspended: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            last_login_at: None,
        };

        let context = AuthContext::from_user(&user);
        assert_eq!(context.user_id, user.id);
        assert_eq!(context.role, UserRole::Admin);
    }

    #[test]
    fn test_auth_error_statuses() {
        assert_eq!(
            AuthError::MissingCredentials.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::InvalidFormat("x".into()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AuthError::Suspended.into_response().status(), StatusCode::FORBIDDEN);
        assert_eq!(
            AuthError::DatabaseError("boom".into()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
