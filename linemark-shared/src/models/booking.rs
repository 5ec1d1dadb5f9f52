//! Line-marking service bookings
//!
//! # Status lifecycle
//!
//! ```text
//! pending ──► confirmed ──► completed
//!    │            │
//!    └────────────┴──► cancelled
//! ```
//!
//! Every other transition, including a status to itself, is rejected.
//! Status writes are conditional on the status that was read, so two
//! concurrent transitions cannot both succeed.

use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::fmt;
use uuid::Uuid;

use crate::pagination::Pagination;

/// Prefix of every booking reference
pub const REFERENCE_PREFIX: &str = "LM";

const REFERENCE_SUFFIX_LENGTH: usize = 6;
const REFERENCE_CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "booking_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Cannot change booking status from {from} to {to}")]
pub struct TransitionError {
    pub from: BookingStatus,
    pub to: BookingStatus,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (BookingStatus::Pending, BookingStatus::Confirmed)
                | (BookingStatus::Confirmed, BookingStatus::Completed)
                | (BookingStatus::Pending, BookingStatus::Cancelled)
                | (BookingStatus::Confirmed, BookingStatus::Cancelled)
        )
    }

    pub fn transition_to(&self, next: BookingStatus) -> Result<BookingStatus, TransitionError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(TransitionError {
                from: *self,
                to: next,
            })
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "time_of_day", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Any,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "contact_preference", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ContactPreference {
    Email,
    Phone,
}

/// Generates a reference like `LM-20250314-K7QX2M`
///
/// The suffix avoids look-alike characters (0/O, 1/I).
pub fn generate_reference(date: NaiveDate) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..REFERENCE_SUFFIX_LENGTH)
        .map(|_| REFERENCE_CHARSET[rng.gen_range(0..REFERENCE_CHARSET.len())] as char)
        .collect();

    format!("{}-{}-{}", REFERENCE_PREFIX, date.format("%Y%m%d"), suffix)
}

/// Checks the `LM-YYYYMMDD-XXXXXX` shape
pub fn is_valid_reference(reference: &str) -> bool {
    let mut parts = reference.split('-');
    let (Some(prefix), Some(date), Some(suffix), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };

    prefix == REFERENCE_PREFIX
        && NaiveDate::parse_from_str(date, "%Y%m%d").is_ok()
        && suffix.len() == REFERENCE_SUFFIX_LENGTH
        && suffix.bytes().all(|b| REFERENCE_CHARSET.contains(&b))
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Booking {
    pub id: Uuid,
    pub configuration_id: Uuid,
    pub user_id: Uuid,
    pub reference: String,
    pub preferred_date: NaiveDate,
    pub alternate_date: Option<NaiveDate>,
    pub time_of_day: TimeOfDay,
    pub contact_preference: ContactPreference,
    pub contact_phone: Option<String>,
    pub notes: Option<String>,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBooking {
    pub configuration_id: Uuid,
    pub user_id: Uuid,
    pub preferred_date: NaiveDate,
    pub alternate_date: Option<NaiveDate>,
    pub time_of_day: TimeOfDay,
    pub contact_preference: ContactPreference,
    pub contact_phone: Option<String>,
    pub notes: Option<String>,
}

/// Booking joined with what an admin calendar needs to show
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct BookingDetail {
    pub id: Uuid,
    pub reference: String,
    pub status: BookingStatus,
    pub preferred_date: NaiveDate,
    pub alternate_date: Option<NaiveDate>,
    pub time_of_day: TimeOfDay,
    pub contact_preference: ContactPreference,
    pub contact_phone: Option<String>,
    pub notes: Option<String>,
    pub user_id: Uuid,
    pub user_email: String,
    pub user_name: Option<String>,
    pub configuration_id: Uuid,
    pub configuration_name: String,
    pub sportsground_id: Uuid,
    pub sportsground_name: String,
    pub created_at: DateTime<Utc>,
}

/// Calendar filters; dates are inclusive
#[derive(Debug, Clone, Default)]
pub struct CalendarFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub status: Option<BookingStatus>,
    /// `ILIKE` pattern over reference, user email and sportsground name
    pub search: Option<String>,
}

const BOOKING_COLUMNS: &str = "id, configuration_id, user_id, reference, preferred_date, \
                               alternate_date, time_of_day, contact_preference, contact_phone, \
                               notes, status, created_at, updated_at";

/// Attempts at a unique reference before giving up
const REFERENCE_ATTEMPTS: usize = 3;

fn is_reference_collision(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.constraint() == Some("bookings_reference_key"),
        _ => false,
    }
}

impl Booking {
    /// Inserts a pending booking with a freshly generated reference
    pub async fn create(pool: &PgPool, data: CreateBooking) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO bookings
                (configuration_id, user_id, reference, preferred_date, alternate_date,
                 time_of_day, contact_preference, contact_phone, notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {BOOKING_COLUMNS}"
        );

        let mut attempt = 0;
        loop {
            attempt += 1;
            let reference = generate_reference(Utc::now().date_naive());

            let result = sqlx::query_as::<_, Booking>(&query)
                .bind(data.configuration_id)
                .bind(data.user_id)
                .bind(&reference)
                .bind(data.preferred_date)
                .bind(data.alternate_date)
                .bind(data.time_of_day)
                .bind(data.contact_preference)
                .bind(data.contact_phone.as_deref())
                .bind(data.notes.as_deref())
                .fetch_one(pool)
                .await;

            match result {
                Err(err) if attempt < REFERENCE_ATTEMPTS && is_reference_collision(&err) => {
                    tracing::warn!(reference = %reference, "Booking reference collision, retrying");
                }
                other => return other,
            }
        }
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1");

        sqlx::query_as::<_, Booking>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_by_user(
        pool: &PgPool,
        user_id: Uuid,
        status: Option<BookingStatus>,
        page: Pagination,
    ) -> Result<(Vec<Self>, i64), sqlx::Error> {
        let query = format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings
             WHERE user_id = $1 AND ($2::booking_status IS NULL OR status = $2)
             ORDER BY preferred_date DESC, created_at DESC
             LIMIT $3 OFFSET $4"
        );

        let items = sqlx::query_as::<_, Booking>(&query)
            .bind(user_id)
            .bind(status)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await?;

        let (total,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM bookings
             WHERE user_id = $1 AND ($2::booking_status IS NULL OR status = $2)",
        )
        .bind(user_id)
        .bind(status)
        .fetch_one(pool)
        .await?;

        Ok((items, total))
    }

    /// Admin calendar, ordered by preferred date
    pub async fn calendar(
        pool: &PgPool,
        filter: &CalendarFilter,
        page: Pagination,
    ) -> Result<(Vec<BookingDetail>, i64), sqlx::Error> {
        const FROM_WHERE: &str = "
             FROM bookings b
             JOIN users u ON u.id = b.user_id
             JOIN field_configurations c ON c.id = b.configuration_id
             JOIN sportsgrounds s ON s.id = c.sportsground_id
             WHERE ($1::date IS NULL OR b.preferred_date >= $1)
               AND ($2::date IS NULL OR b.preferred_date <= $2)
               AND ($3::booking_status IS NULL OR b.status = $3)
               AND ($4::text IS NULL OR b.reference ILIKE $4 OR u.email ILIKE $4 OR s.name ILIKE $4)";

        let query = format!(
            "SELECT b.id, b.reference, b.status, b.preferred_date, b.alternate_date,
                    b.time_of_day, b.contact_preference, b.contact_phone, b.notes,
                    b.user_id, u.email AS user_email, u.name AS user_name,
                    b.configuration_id, c.name AS configuration_name,
                    s.id AS sportsground_id, s.name AS sportsground_name,
                    b.created_at
             {FROM_WHERE}
             ORDER BY b.preferred_date ASC, b.created_at ASC
             LIMIT $5 OFFSET $6"
        );

        let items = sqlx::query_as::<_, BookingDetail>(&query)
            .bind(filter.from)
            .bind(filter.to)
            .bind(filter.status)
            .bind(filter.search.as_deref())
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await?;

        let count_query = format!("SELECT COUNT(*) {FROM_WHERE}");
        let (total,): (i64,) = sqlx::query_as(&count_query)
            .bind(filter.from)
            .bind(filter.to)
            .bind(filter.status)
            .bind(filter.search.as_deref())
            .fetch_one(pool)
            .await?;

        Ok((items, total))
    }

    /// Moves the booking from `from` to `to`
    ///
    /// Returns `None` when the stored status is no longer `from`, so callers
    /// can report a conflict.
    pub async fn update_status(
        pool: &PgPool,
        id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "UPDATE bookings SET status = $3
             WHERE id = $1 AND status = $2
             RETURNING {BOOKING_COLUMNS}"
        );

        sqlx::query_as::<_, Booking>(&query)
            .bind(id)
            .bind(from)
            .bind(to)
            .fetch_optional(pool)
            .await
    }

    pub async fn count_by_status(pool: &PgPool) -> Result<Vec<(BookingStatus, i64)>, sqlx::Error> {
        sqlx::query_as("SELECT status, COUNT(*) FROM bookings GROUP BY status ORDER BY status")
            .fetch_all(pool)
            .await
    }

    /// Pending or confirmed bookings dated today or later
    pub async fn count_upcoming(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM bookings
             WHERE preferred_date >= CURRENT_DATE AND status IN ('pending', 'confirmed')",
        )
        .fetch_one(pool)
        .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [BookingStatus; 4] = [
        BookingStatus::Pending,
        BookingStatus::Confirmed,
        BookingStatus::Completed,
        BookingStatus::Cancelled,
    ];

    #[test]
    fn test_allowed_transitions() {
        use BookingStatus::*;
        let allowed = [
            (Pending, Confirmed),
            (Confirmed, Completed),
            (Pending, Cancelled),
            (Confirmed, Cancelled),
        ];

        for from in ALL {
            for to in ALL {
                let expected = allowed.contains(&(from, to));
                assert_eq!(from.can_transition_to(to), expected, "{from} -> {to}");
            }
        }
    }

    #[test]
    fn test_transition_error_names_both_states() {
        let err = BookingStatus::Completed
            .transition_to(BookingStatus::Pending)
            .unwrap_err();
        assert_eq!(err.to_string(), "Cannot change booking status from completed to pending");
        assert_eq!(
            BookingStatus::Pending.transition_to(BookingStatus::Confirmed),
            Ok(BookingStatus::Confirmed)
        );
    }

    #[test]
    fn test_terminal_states() {
        assert!(BookingStatus::Completed.is_terminal());
        assert!(BookingStatus::Cancelled.is_terminal());
        assert!(!BookingStatus::Pending.is_terminal());
    }

    #[test]
    fn test_reference_shape() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        let reference = generate_reference(date);

        assert!(reference.starts_with("LM-20250314-"));
        assert_eq!(reference.len(), "LM-20250314-".len() + 6);
        assert!(is_valid_reference(&reference));
    }

    #[test]
    fn test_reference_validation() {
        assert!(is_valid_reference("LM-20250314-K7QX2M"));
        assert!(!is_valid_reference("LM-20251340-K7QX2M"));
        assert!(!is_valid_reference("XX-20250314-K7QX2M"));
        assert!(!is_valid_reference("LM-20250314-K7QX2"));
        assert!(!is_valid_reference("LM-20250314-K7QX2O"));
        assert!(!is_valid_reference("LM-20250314-K7QX2M-1"));
    }

    #[test]
    fn test_enum_serde() {
        assert_eq!(serde_json::to_string(&TimeOfDay::Afternoon).unwrap(), "\"afternoon\"");
        assert_eq!(serde_json::to_string(&ContactPreference::Phone).unwrap(), "\"phone\"");
        let status: BookingStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(status, BookingStatus::Cancelled);
    }
}
