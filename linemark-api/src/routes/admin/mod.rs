//! Administration endpoints
//!
//! Mounted under `/api/admin` behind the bearer-token middleware and an
//! admin-role check, so every handler here can assume `role >= admin`.
//! Account-level actions additionally go through the authorization table
//! (self-protection, hierarchy, grant).
//!
//! # Endpoints
//!
//! - `GET /stats` - Platform counters
//! - `GET /users` - Users (`role`, `q`, paging)
//! - `PATCH /users/:id` - Role, suspension, verification
//! - `DELETE /users/:id` - Delete an account
//! - `GET /sportsgrounds` - Every sportsground with owner and counts
//! - `PATCH /sportsgrounds/:id` - Transfer a sportsground to another user
//! - `GET /configurations/:id` - Any configuration
//! - `PATCH /configurations/:id` - Update, including owner transfer
//! - `GET /templates` - All templates, inactive included
//! - `POST /templates` - Create a template
//! - `PATCH /templates/:id` - Update a template
//! - `GET /bookings` - Booking calendar (`from`, `to`, `status`, `q`, paging)
//! - `POST /bookings/:id/status` - Move a booking through its lifecycle
//! - `GET /invitations` - Invitations (`kind`, paging)
//! - `POST /invitations` - Invite a user or admin
//! - `DELETE /invitations/:id` - Revoke a pending invitation

pub mod bookings;
pub mod configurations;
pub mod invitations;
pub mod sportsgrounds;
pub mod stats;
pub mod templates;
pub mod users;

use axum::{
    routing::{delete, get, patch, post},
    Router,
};

use crate::app::AppState;

pub use bookings::{change_booking_status, list_calendar};
pub use configurations::{get_configuration, update_configuration};
pub use invitations::{create_invitation, list_invitations, revoke_invitation};
pub use sportsgrounds::{list_sportsgrounds, transfer_sportsground};
pub use stats::get_stats;
pub use templates::{create_template, list_templates, update_template};
pub use users::{delete_user, list_users, update_user};

/// Admin routes, relative to `/api/admin`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stats", get(get_stats))
        .route("/users", get(list_users))
        .route("/users/:id", patch(update_user).delete(delete_user))
        .route("/sportsgrounds", get(list_sportsgrounds))
        .route("/sportsgrounds/:id", patch(transfer_sportsground))
        .route(
            "/configurations/:id",
            get(get_configuration).patch(update_configuration),
        )
        .route("/templates", get(list_templates).post(create_template))
        .route("/templates/:id", patch(update_template))
        .route("/bookings", get(list_calendar))
        .route("/bookings/:id/status", post(change_booking_status))
        .route("/invitations", get(list_invitations).post(create_invitation))
        .route("/invitations/:id", delete(revoke_invitation))
}
