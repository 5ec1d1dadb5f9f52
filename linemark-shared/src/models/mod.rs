//! Database models for Linemark
//!
//! # Models
//!
//! - `user`: Accounts and roles
//! - `sportsground`: Venues owned by a user
//! - `field_template`: Admin-managed sport templates with dimension bounds
//! - `field_configuration`: A placed, rotated and sized field on a sportsground
//! - `booking`: Line-marking service requests and their status workflow
//! - `invitation`: Admin and user invitations
//!
//! # Example
//!
//! ```no_run
//! use linemark_shared::db::pool::{create_pool, DatabaseConfig};
//! use linemark_shared::models::field_template::FieldTemplate;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool(DatabaseConfig::default()).await?;
//! for template in FieldTemplate::list_active(&pool).await? {
//!     println!("{} ({:?})", template.name, template.bounds());
//! }
//! # Ok(())
//! # }
//! ```

pub mod booking;
pub mod field_configuration;
pub mod field_template;
pub mod invitation;
pub mod sportsground;
pub mod user;
