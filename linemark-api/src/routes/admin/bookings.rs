//! Booking calendar and lifecycle control

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::{
        bookings::{find_booking, transition},
        ValidatedJson,
    },
};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use linemark_shared::{
    models::booking::{Booking, BookingDetail, BookingStatus, CalendarFilter},
    pagination::{Page, PageParams},
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Inclusive preferred-date window plus status
#[derive(Debug, Default, Deserialize)]
pub struct CalendarQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub status: Option<BookingStatus>,
}

impl CalendarQuery {
    pub fn into_filter(self, search: Option<String>) -> ApiResult<CalendarFilter> {
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                return Err(ApiError::invalid("to", "`to` must not be before `from`"));
            }
        }
        Ok(CalendarFilter {
            from: self.from,
            to: self.to,
            status: self.status,
            search,
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct StatusChangeRequest {
    pub status: BookingStatus,
}

/// Bookings with user, configuration and sportsground names, by preferred date
pub async fn list_calendar(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
    Query(calendar): Query<CalendarQuery>,
) -> ApiResult<Json<Page<BookingDetail>>> {
    let pagination = params.resolve()?;
    let filter = calendar.into_filter(params.search_pattern())?;

    let (items, total) = Booking::calendar(&state.db, &filter, pagination).await?;

    Ok(Json(Page::new(items, pagination, total)))
}

/// Move a booking to a new status
///
/// # Errors
///
/// - `404 Not Found`: Unknown booking
/// - `409 Conflict`: Transition not allowed from the current status
pub async fn change_booking_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<StatusChangeRequest>,
) -> ApiResult<Json<Booking>> {
    let booking = find_booking(&state, id).await?;
    let booking = transition(&state, &booking, req.status).await?;
    Ok(Json(booking))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2025, 3, d)
    }

    #[test]
    fn test_calendar_window() {
        let ok = CalendarQuery {
            from: date(1),
            to: date(31),
            status: Some(BookingStatus::Pending),
        }
        .into_filter(Some("%LM%".to_string()))
        .unwrap();
        assert_eq!(ok.from, date(1));
        assert_eq!(ok.search.as_deref(), Some("%LM%"));

        let single_day = CalendarQuery {
            from: date(14),
            to: date(14),
            status: None,
        };
        assert!(single_day.into_filter(None).is_ok());

        let inverted = CalendarQuery {
            from: date(20),
            to: date(10),
            status: None,
        };
        assert!(matches!(
            inverted.into_filter(None),
            Err(ApiError::ValidationError(_))
        ));
    }

    #[test]
    fn test_calendar_query_parses_dates() {
        let query: CalendarQuery =
            serde_json::from_str(r#"{"from": "2025-03-01", "status": "completed"}"#).unwrap();
        assert_eq!(query.from, date(1));
        assert!(query.to.is_none());
        assert_eq!(query.status, Some(BookingStatus::Completed));
    }
}
