//! Error handling for the API server
//!
//! Every handler returns [`ApiResult`]; library errors convert through the
//! `From` impls below so handlers can use `?` throughout.
//!
//! Failures are rendered as
//!
//! ```json
//! { "error": "validation_error", "message": "Request validation failed",
//!   "details": [{ "field": "length", "message": "length 150 m is outside 90..=120 m" }] }
//! ```
//!
//! # Example
//!
//! ```
//! use linemark_api::error::{ApiError, ApiResult};
//! use axum::Json;
//! use serde_json::{json, Value};
//!
//! async fn handler(id: Option<u32>) -> ApiResult<Json<Value>> {
//!     let id = id.ok_or_else(|| ApiError::NotFound("Sportsground not found".to_string()))?;
//!     Ok(Json(json!({ "id": id })))
//! }
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use linemark_editor::{Dimension, EditorError, GeometryError};
use linemark_shared::{
    auth::{authorization::AuthzError, jwt::JwtError, password::PasswordError},
    models::{booking::TransitionError, field_configuration::ConfigurationError},
    pagination::PaginationError,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Forbidden (403)
    Forbidden(String),

    /// Not found (404)
    NotFound(String),

    /// Conflict (409), e.g. duplicate email or a disallowed booking transition
    Conflict(String),

    /// Unprocessable entity (422)
    ValidationError(Vec<ValidationErrorDetail>),

    /// Internal server error (500)
    InternalError(String),

    /// Service unavailable (503)
    ServiceUnavailable(String),
}

/// Validation error detail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "bad_request", "unauthorized")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl ApiError {
    /// Single-field validation failure
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::ValidationError(vec![ValidationErrorDetail {
            field: field.into(),
            message: message.into(),
        }])
    }

    pub fn not_found(resource: &str) -> Self {
        ApiError::NotFound(format!("{} not found", resource))
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            ApiError::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::ValidationError(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                "Request validation failed".to_string(),
                Some(errors),
            ),
            ApiError::InternalError(msg) => {
                // Logged here, never sent to the client
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
            ApiError::ServiceUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "service_unavailable",
                msg,
                None,
            ),
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::PoolTimedOut => {
                ApiError::ServiceUnavailable("Database is busy, try again later".to_string())
            }
            sqlx::Error::Database(db_err) => match db_err.constraint() {
                Some("users_email_key") => ApiError::Conflict("Email already exists".to_string()),
                Some("field_templates_name_key") => {
                    ApiError::Conflict("A template with this name already exists".to_string())
                }
                Some(constraint) if db_err.is_foreign_key_violation() => {
                    ApiError::Conflict(format!("Referenced record is missing or in use ({})", constraint))
                }
                Some(constraint) => {
                    ApiError::Conflict(format!("Constraint violation: {}", constraint))
                }
                None => ApiError::InternalError(format!("Database error: {}", db_err)),
            },
            _ => ApiError::InternalError(format!("Database error: {}", err)),
        }
    }
}

impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        ApiError::Forbidden(err.to_string())
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::InternalError(format!("Password operation failed: {}", err))
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::CreateError(msg) => ApiError::InternalError(format!("Token creation failed: {}", msg)),
            JwtError::Expired => ApiError::Unauthorized("Token expired".to_string()),
            JwtError::InvalidIssuer => ApiError::Unauthorized("Invalid token issuer".to_string()),
            _ => ApiError::Unauthorized(format!("Invalid token: {}", err)),
        }
    }
}

/// Request field a geometry error is about
pub fn geometry_field(err: &GeometryError) -> &'static str {
    match err {
        GeometryError::NonFinite => "geometry",
        GeometryError::LatitudeOutOfRange(_) => "center_lat",
        GeometryError::LongitudeOutOfRange(_) => "center_lng",
        GeometryError::InvalidBounds { dimension, .. } => match dimension {
            Dimension::Length => "min_length",
            Dimension::Width => "min_width",
        },
        GeometryError::OutOfBounds { dimension, .. } => dimension.as_str(),
        GeometryError::InvalidColor(_) => "line_color",
    }
}

impl From<GeometryError> for ApiError {
    fn from(err: GeometryError) -> Self {
        ApiError::invalid(geometry_field(&err), err.to_string())
    }
}

impl From<EditorError> for ApiError {
    fn from(err: EditorError) -> Self {
        match err {
            EditorError::Geometry(geometry) => geometry.into(),
            EditorError::MissingName => ApiError::invalid("name", err.to_string()),
            EditorError::NotPlaced => ApiError::invalid("center", err.to_string()),
            EditorError::NoActiveDrag | EditorError::DragInProgress => {
                ApiError::Conflict(err.to_string())
            }
        }
    }
}

impl From<ConfigurationError> for ApiError {
    fn from(err: ConfigurationError) -> Self {
        match err {
            ConfigurationError::Geometry(geometry) => geometry.into(),
            ConfigurationError::InactiveTemplate => ApiError::invalid("template_id", err.to_string()),
            ConfigurationError::OwnerMismatch => ApiError::invalid("owner_id", err.to_string()),
        }
    }
}

impl From<TransitionError> for ApiError {
    fn from(err: TransitionError) -> Self {
        ApiError::Conflict(err.to_string())
    }
}

impl From<PaginationError> for ApiError {
    fn from(err: PaginationError) -> Self {
        ApiError::invalid(err.field(), err.to_string())
    }
}

/// Field errors of `errors` and of any nested structs, keyed by leaf field
fn collect_validation_details(
    errors: &validator::ValidationErrors,
    details: &mut Vec<ValidationErrorDetail>,
) {
    use validator::ValidationErrorsKind;

    for (field, kind) in errors.errors() {
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                details.extend(field_errors.iter().map(|error| ValidationErrorDetail {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                }));
            }
            ValidationErrorsKind::Struct(nested) => collect_validation_details(nested, details),
            ValidationErrorsKind::List(items) => {
                for nested in items.values() {
                    collect_validation_details(nested, details);
                }
            }
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details = Vec::new();
        collect_validation_details(&errors, &mut details);
        // errors() is a HashMap
        details.sort_by(|a, b| a.field.cmp(&b.field));
        ApiError::ValidationError(details)
    }
}
