//! User accounts
//!
//! Emails are unique case-insensitively (`users_email_key` on
//! `LOWER(email)`), so every lookup lowercases both sides.
//!
//! # Example
//!
//! ```no_run
//! use linemark_shared::models::user::{CreateUser, User, UserRole};
//! use sqlx::PgPool;
//!
//! # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
//! let user = User::create(&pool, CreateUser {
//!     email: "groundsman@example.com".to_string(),
//!     password_hash: "$argon2id$...".to_string(),
//!     name: Some("Pat".to_string()),
//!     role: UserRole::User,
//!     email_verified: false,
//! }).await?;
//!
//! let found = User::find_by_email(&pool, "Groundsman@Example.com").await?;
//! assert_eq!(found.map(|u| u.id), Some(user.id));
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::fmt;
use uuid::Uuid;

use crate::pagination::Pagination;

/// Account role, ordered `User < Admin < SuperAdmin`
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    User,
    Admin,
    SuperAdmin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Admin => "admin",
            UserRole::SuperAdmin => "super_admin",
        }
    }

    /// Numeric rank used by the authorization table
    pub fn rank(&self) -> u8 {
        match self {
            UserRole::User => 0,
            UserRole::Admin => 1,
            UserRole::SuperAdmin => 2,
        }
    }

    pub fn is_admin(&self) -> bool {
        *self >= UserRole::Admin
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: Option<String>,
    pub role: UserRole,
    pub email_verified: bool,
    pub is_suspended: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub email: String,
    pub password_hash: String,
    pub name: Option<String>,
    pub role: UserRole,
    pub email_verified: bool,
}

/// Partial update; `None` leaves a column unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUser {
    pub email: Option<String>,
    pub password_hash: Option<String>,
    /// `Some(None)` clears the name
    pub name: Option<Option<String>>,
    pub role: Option<UserRole>,
    pub email_verified: Option<bool>,
    pub is_suspended: Option<bool>,
}

impl UpdateUser {
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.password_hash.is_none()
            && self.name.is_none()
            && self.role.is_none()
            && self.email_verified.is_none()
            && self.is_suspended.is_none()
    }
}

/// Filters for the admin user list
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    /// `ILIKE` pattern matched against email and name
    pub search: Option<String>,
    pub role: Option<UserRole>,
}

const USER_COLUMNS: &str = "id, email, password_hash, name, role, email_verified, is_suspended, \
                            created_at, updated_at, last_login_at";

impl User {
    /// Inserts a user; accepts a pool or an open transaction
    pub async fn create<'e, E>(executor: E, data: CreateUser) -> Result<Self, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO users (email, password_hash, name, role, email_verified)
             VALUES (LOWER($1), $2, $3, $4, $5)
             RETURNING {USER_COLUMNS}"
        );

        sqlx::query_as::<_, User>(&query)
            .bind(data.email.trim())
            .bind(data.password_hash)
            .bind(data.name)
            .bind(data.role)
            .bind(data.email_verified)
            .fetch_one(executor)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");

        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1)");

        sqlx::query_as::<_, User>(&query)
            .bind(email.trim())
            .fetch_optional(pool)
            .await
    }

    /// Applies a partial update, returning `None` if the user does not exist
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateUser,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE users SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.email.is_some() {
            bind_count += 1;
            query.push_str(&format!(", email = LOWER(${})", bind_count));
        }
        if data.password_hash.is_some() {
            bind_count += 1;
            query.push_str(&format!(", password_hash = ${}", bind_count));
        }
        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.role.is_some() {
            bind_count += 1;
            query.push_str(&format!(", role = ${}", bind_count));
        }
        if data.email_verified.is_some() {
            bind_count += 1;
            query.push_str(&format!(", email_verified = ${}", bind_count));
        }
        if data.is_suspended.is_some() {
            bind_count += 1;
            query.push_str(&format!(", is_suspended = ${}", bind_count));
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {USER_COLUMNS}"));

        let mut q = sqlx::query_as::<_, User>(&query).bind(id);

        if let Some(email) = data.email {
            q = q.bind(email.trim().to_string());
        }
        if let Some(password_hash) = data.password_hash {
            q = q.bind(password_hash);
        }
        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(role) = data.role {
            q = q.bind(role);
        }
        if let Some(verified) = data.email_verified {
            q = q.bind(verified);
        }
        if let Some(suspended) = data.is_suspended {
            q = q.bind(suspended);
        }

        q.fetch_optional(pool).await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn update_last_login(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Newest first, with total count for the filter
    pub async fn list(
        pool: &PgPool,
        filter: &UserFilter,
        page: Pagination,
    ) -> Result<(Vec<Self>, i64), sqlx::Error> {
        let query = format!(
            "SELECT {USER_COLUMNS} FROM users
             WHERE ($1::text IS NULL OR email ILIKE $1 OR name ILIKE $1)
               AND ($2::user_role IS NULL OR role = $2)
             ORDER BY created_at DESC
             LIMIT $3 OFFSET $4"
        );

        let users = sqlx::query_as::<_, User>(&query)
            .bind(filter.search.as_deref())
            .bind(filter.role)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await?;

        let (total,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM users
             WHERE ($1::text IS NULL OR email ILIKE $1 OR name ILIKE $1)
               AND ($2::user_role IS NULL OR role = $2)",
        )
        .bind(filter.search.as_deref())
        .bind(filter.role)
        .fetch_one(pool)
        .await?;

        Ok((users, total))
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Number of accounts with each role
    pub async fn count_by_role(pool: &PgPool) -> Result<Vec<(UserRole, i64)>, sqlx::Error> {
        sqlx::query_as("SELECT role, COUNT(*) FROM users GROUP BY role ORDER BY role")
            .fetch_all(pool)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_ordering() {
        assert!(UserRole::User < UserRole::Admin);
        assert!(UserRole::Admin < UserRole::SuperAdmin);
        assert!(UserRole::SuperAdmin.rank() > UserRole::Admin.rank());
        assert!(!UserRole::User.is_admin());
        assert!(UserRole::SuperAdmin.is_admin());
    }

    #[test]
    fn test_role_serde() {
        assert_eq!(
            serde_json::to_string(&UserRole::SuperAdmin).unwrap(),
            "\"super_admin\""
        );
        let role: UserRole = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, UserRole::Admin);
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User {
            id: Uuid::new_v4(),
            email: "pat@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            name: None,
            role: UserRole::User,
            email_verified: true,
            is_suspended: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            last_login_at: None,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "user");
    }

    #[test]
    fn test_update_user_is_empty() {
        assert!(UpdateUser::default().is_empty());
        let update = UpdateUser {
            is_suspended: Some(true),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
