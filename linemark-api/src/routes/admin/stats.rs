//! Platform counters for the admin dashboard
//!
//! # Example Response
//!
//! ```json
//! {
//!   "users": { "total": 42, "by_role": { "user": 39, "admin": 2, "super_admin": 1 } },
//!   "sportsgrounds": 17,
//!   "configurations": 31,
//!   "bookings": { "by_status": { "pending": 4, "confirmed": 6 }, "upcoming": 8 }
//! }
//! ```

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use linemark_shared::models::{
    booking::Booking, field_configuration::FieldConfiguration, sportsground::Sportsground,
    user::User,
};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub users: UserStats,
    pub sportsgrounds: i64,
    pub configurations: i64,
    pub bookings: BookingStats,
}

#[derive(Debug, Serialize)]
pub struct UserStats {
    pub total: i64,
    pub by_role: BTreeMap<&'static str, i64>,
}

#[derive(Debug, Serialize)]
pub struct BookingStats {
    pub by_status: BTreeMap<&'static str, i64>,
    /// Pending or confirmed, dated today or later
    pub upcoming: i64,
}

pub async fn get_stats(State(state): State<AppState>) -> ApiResult<Json<StatsResponse>> {
    let by_role = User::count_by_role(&state.db)
        .await?
        .into_iter()
        .map(|(role, count)| (role.as_str(), count))
        .collect();

    let by_status = Booking::count_by_status(&state.db)
        .await?
        .into_iter()
        .map(|(status, count)| (status.as_str(), count))
        .collect();

    Ok(Json(StatsResponse {
        users: UserStats {
            total: User::count(&state.db).await?,
            by_role,
        },
        sportsgrounds: Sportsground::count(&state.db).await?,
        configurations: FieldConfiguration::count(&state.db).await?,
        bookings: BookingStats {
            by_status,
            upcoming: Booking::count_upcoming(&state.db).await?,
        },
    }))
}
