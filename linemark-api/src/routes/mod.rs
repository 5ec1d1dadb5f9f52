//! API route handlers, one module per resource
//!
//! - `health`: Health check
//! - `auth`: Registration, login, token refresh, invitation acceptance
//! - `users`: The caller's own profile and password
//! - `sportsgrounds`: Sportsground CRUD
//! - `templates`: Active field templates
//! - `configurations`: Field configurations and their rendered geometry
//! - `bookings`: Line-marking bookings
//! - `admin`: Administration under `/api/admin`

pub mod admin;
pub mod auth;
pub mod bookings;
pub mod configurations;
pub mod health;
pub mod sportsgrounds;
pub mod templates;
pub mod users;

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use validator::Validate;

use crate::error::ApiError;

/// JSON body that has been run through `validator` before the handler sees it
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

/// For `#[serde(default, deserialize_with = "nullable")]` on PATCH fields:
/// absent stays `None`, an explicit `null` becomes `Some(None)`
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Trims optional free text, treating blank as absent
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
