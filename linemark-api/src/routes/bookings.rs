//! Booking endpoints
//!
//! # Endpoints
//!
//! - `GET /api/bookings` - The caller's bookings (`status`, paging)
//! - `POST /api/bookings` - Request line marking for a configuration
//! - `GET /api/bookings/:id` - Get one (booker or admin)
//! - `POST /api/bookings/:id/cancel` - Cancel while pending or confirmed
//!
//! Admins move bookings through the rest of the lifecycle via
//! `/api/admin/bookings/:id/status`.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::{configurations, non_blank, ValidatedJson},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{NaiveDate, Utc};
use linemark_shared::{
    auth::{authorization, middleware::AuthContext},
    models::booking::{Booking, BookingStatus, ContactPreference, CreateBooking, TimeOfDay},
    pagination::{Page, PageParams},
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateBookingRequest {
    pub configuration_id: Uuid,
    pub preferred_date: NaiveDate,
    pub alternate_date: Option<NaiveDate>,

    #[serde(default = "default_time_of_day")]
    pub time_of_day: TimeOfDay,

    #[serde(default = "default_contact_preference")]
    pub contact_preference: ContactPreference,

    #[validate(length(max = 30, message = "Phone number must be at most 30 characters"))]
    pub contact_phone: Option<String>,

    #[validate(length(max = 2000, message = "Notes must be at most 2000 characters"))]
    pub notes: Option<String>,
}

fn default_time_of_day() -> TimeOfDay {
    TimeOfDay::Any
}

fn default_contact_preference() -> ContactPreference {
    ContactPreference::Email
}

#[derive(Debug, Default, Deserialize)]
pub struct StatusFilter {
    pub status: Option<BookingStatus>,
}

/// Date rules for a new booking
///
/// Neither date may be in the past, and the alternate must differ from the
/// preferred date.
pub fn check_dates(
    preferred: NaiveDate,
    alternate: Option<NaiveDate>,
    today: NaiveDate,
) -> ApiResult<()> {
    if preferred < today {
        return Err(ApiError::invalid(
            "preferred_date",
            "Preferred date cannot be in the past",
        ));
    }
    if let Some(alternate) = alternate {
        if alternate < today {
            return Err(ApiError::invalid(
                "alternate_date",
                "Alternate date cannot be in the past",
            ));
        }
        if alternate == preferred {
            return Err(ApiError::invalid(
                "alternate_date",
                "Alternate date must differ from the preferred date",
            ));
        }
    }
    Ok(())
}

/// A phone number is required when the booker asked to be called
pub fn check_contact(
    preference: ContactPreference,
    phone: Option<String>,
) -> ApiResult<Option<String>> {
    let phone = non_blank(phone);
    if preference == ContactPreference::Phone && phone.is_none() {
        return Err(ApiError::invalid(
            "contact_phone",
            "Phone number is required when contact preference is phone",
        ));
    }
    Ok(phone)
}

pub(crate) async fn find_booking(state: &AppState, id: Uuid) -> ApiResult<Booking> {
    Booking::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Booking"))
}

/// Applies a lifecycle transition
///
/// The write is conditional on the status just read; losing a race with a
/// concurrent transition is a 409.
pub(crate) async fn transition(
    state: &AppState,
    booking: &Booking,
    next: BookingStatus,
) -> ApiResult<Booking> {
    let next = booking.status.transition_to(next)?;

    let updated = Booking::update_status(&state.db, booking.id, booking.status, next)
        .await?
        .ok_or_else(|| {
            ApiError::Conflict("Booking status changed concurrently, reload and retry".to_string())
        })?;

    tracing::info!(
        booking_id = %booking.id,
        reference = %booking.reference,
        from = %booking.status,
        to = %next,
        "Booking status changed"
    );

    Ok(updated)
}

pub async fn list_bookings(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(params): Query<PageParams>,
    Query(filter): Query<StatusFilter>,
) -> ApiResult<Json<Page<Booking>>> {
    let pagination = params.resolve()?;

    let (items, total) =
        Booking::list_by_user(&state.db, auth.user_id, filter.status, pagination).await?;

    Ok(Json(Page::new(items, pagination, total)))
}

/// Request line marking for a configuration
///
/// ```text
/// POST /api/bookings
///
/// { "configuration_id": "...", "preferred_date": "2025-03-14",
///   "time_of_day": "morning", "contact_preference": "phone",
///   "contact_phone": "+61 400 000 000" }
/// ```
///
/// # Errors
///
/// - `404 Not Found`: Configuration does not exist
/// - `403 Forbidden`: Caller neither owns the configuration nor is an admin
/// - `422 Unprocessable Entity`: Date or contact rules violated
pub async fn create_booking(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidatedJson(req): ValidatedJson<CreateBookingRequest>,
) -> ApiResult<(StatusCode, Json<Booking>)> {
    check_dates(req.preferred_date, req.alternate_date, Utc::now().date_naive())?;
    let contact_phone = check_contact(req.contact_preference, req.contact_phone)?;

    let configuration = configurations::find_configuration(&state, req.configuration_id).await?;
    authorization::require_owner_or_admin(&auth, configuration.owner_id)?;

    let booking = Booking::create(
        &state.db,
        CreateBooking {
            configuration_id: configuration.id,
            user_id: auth.user_id,
            preferred_date: req.preferred_date,
            alternate_date: req.alternate_date,
            time_of_day: req.time_of_day,
            contact_preference: req.contact_preference,
            contact_phone,
            notes: non_blank(req.notes),
        },
    )
    .await?;

    tracing::info!(
        booking_id = %booking.id,
        reference = %booking.reference,
        configuration_id = %configuration.id,
        "Booking created"
    );

    Ok((StatusCode::CREATED, Json(booking)))
}

pub async fn get_booking(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Booking>> {
    let booking = find_booking(&state, id).await?;
    authorization::require_owner_or_admin(&auth, booking.user_id)?;
    Ok(Json(booking))
}

/// Cancel one of the caller's bookings
///
/// # Errors
///
/// - `403 Forbidden`: Not the caller's booking
/// - `409 Conflict`: Already completed or cancelled
pub async fn cancel_booking(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Booking>> {
    let booking = find_booking(&state, id).await?;
    authorization::require_owner(&auth, booking.user_id)?;

    let booking = transition(&state, &booking, BookingStatus::Cancelled).await?;
    Ok(Json(booking))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn field_of(result: ApiResult<()>) -> String {
        match result {
            Err(ApiError::ValidationError(details)) => details[0].field.clone(),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_check_dates() {
        let today = date(2025, 3, 10);

        assert!(check_dates(today, None, today).is_ok());
        assert!(check_dates(date(2025, 3, 14), Some(date(2025, 3, 15)), today).is_ok());

        assert_eq!(field_of(check_dates(date(2025, 3, 9), None, today)), "preferred_date");
        assert_eq!(
            field_of(check_dates(date(2025, 3, 14), Some(date(2025, 3, 1)), today)),
            "alternate_date"
        );
        assert_eq!(
            field_of(check_dates(date(2025, 3, 14), Some(date(2025, 3, 14)), today)),
            "alternate_date"
        );
    }

    #[test]
    fn test_check_contact() {
        assert_eq!(check_contact(ContactPreference::Email, None).unwrap(), None);
        assert!(check_contact(ContactPreference::Phone, Some("  ".to_string())).is_err());
        assert_eq!(
            check_contact(ContactPreference::Phone, Some(" 0400 000 000 ".to_string())).unwrap(),
            Some("0400 000 000".to_string())
        );
    }

    #[test]
    fn test_request_defaults() {
        let req: CreateBookingRequest = serde_json::from_str(
            r#"{"configuration_id": "6f1c1d3e-2b7a-4c1e-9a55-0d2a4f3b9e10",
                "preferred_date": "2025-03-14"}"#,
        )
        .unwrap();
        assert_eq!(req.time_of_day, TimeOfDay::Any);
        assert_eq!(req.contact_preference, ContactPreference::Email);
    }

    #[test]
    fn test_status_filter_parses_lowercase() {
        let filter: StatusFilter = serde_json::from_str(r#"{"status": "confirmed"}"#).unwrap();
        assert_eq!(filter.status, Some(BookingStatus::Confirmed));
    }
}
