//! Admin and user invitations
//!
//! An invitation grants a role to whoever redeems its token before
//! `expires_at`. Admin invitations grant `admin`; user invitations grant
//! `user`. Redeeming creates the account with a verified email.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::user::UserRole;
use crate::auth::token;
use crate::pagination::Pagination;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "invitation_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum InvitationKind {
    Admin,
    User,
}

impl InvitationKind {
    /// Role granted on acceptance
    pub fn granted_role(&self) -> UserRole {
        match self {
            InvitationKind::Admin => UserRole::Admin,
            InvitationKind::User => UserRole::User,
        }
    }
}

/// Lifecycle state derived from the timestamps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationState {
    Pending,
    Accepted,
    Revoked,
    Expired,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Invitation {
    pub id: Uuid,
    pub kind: InvitationKind,
    pub email: String,
    #[serde(skip_serializing)]
    pub token_hash: String,
    pub role: UserRole,
    pub invited_by: Option<Uuid>,
    pub expires_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateInvitation {
    pub kind: InvitationKind,
    pub email: String,
    pub invited_by: Uuid,
    pub ttl: Duration,
}

const INVITATION_COLUMNS: &str = "id, kind, email, token_hash, role, invited_by, expires_at, \
                                  accepted_at, revoked_at, created_at";

impl Invitation {
    pub fn state_at(&self, now: DateTime<Utc>) -> InvitationState {
        if self.accepted_at.is_some() {
            InvitationState::Accepted
        } else if self.revoked_at.is_some() {
            InvitationState::Revoked
        } else if now >= self.expires_at {
            InvitationState::Expired
        } else {
            InvitationState::Pending
        }
    }

    pub fn state(&self) -> InvitationState {
        self.state_at(Utc::now())
    }

    /// Creates an invitation and returns it with the plaintext token
    ///
    /// The token is not stored and cannot be recovered later.
    pub async fn create(
        pool: &PgPool,
        data: CreateInvitation,
    ) -> Result<(Self, String), sqlx::Error> {
        let (plaintext, token_hash) = token::generate_token();
        let query = format!(
            "INSERT INTO invitations (kind, email, token_hash, role, invited_by, expires_at)
             VALUES ($1, LOWER($2), $3, $4, $5, $6)
             RETURNING {INVITATION_COLUMNS}"
        );

        let invitation = sqlx::query_as::<_, Invitation>(&query)
            .bind(data.kind)
            .bind(data.email.trim())
            .bind(token_hash)
            .bind(data.kind.granted_role())
            .bind(data.invited_by)
            .bind(Utc::now() + data.ttl)
            .fetch_one(pool)
            .await?;

        Ok((invitation, plaintext))
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {INVITATION_COLUMNS} FROM invitations WHERE id = $1");

        sqlx::query_as::<_, Invitation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_token(pool: &PgPool, plaintext: &str) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {INVITATION_COLUMNS} FROM invitations WHERE token_hash = $1");

        sqlx::query_as::<_, Invitation>(&query)
            .bind(token::hash_token(plaintext))
            .fetch_optional(pool)
            .await
    }

    /// Whether an unexpired, unused invitation already exists for the email
    pub async fn has_pending(pool: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (
                SELECT 1 FROM invitations
                WHERE LOWER(email) = LOWER($1)
                  AND accepted_at IS NULL AND revoked_at IS NULL AND expires_at > NOW()
             )",
        )
        .bind(email.trim())
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    pub async fn list(
        pool: &PgPool,
        kind: Option<InvitationKind>,
        page: Pagination,
    ) -> Result<(Vec<Self>, i64), sqlx::Error> {
        let query = format!(
            "SELECT {INVITATION_COLUMNS} FROM invitations
             WHERE ($1::invitation_kind IS NULL OR kind = $1)
             ORDER BY created_at DESC
             LIMIT $2 OFFSET $3"
        );

        let items = sqlx::query_as::<_, Invitation>(&query)
            .bind(kind)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await?;

        let (total,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM invitations WHERE ($1::invitation_kind IS NULL OR kind = $1)",
        )
        .bind(kind)
        .fetch_one(pool)
        .await?;

        Ok((items, total))
    }

    /// Marks a pending invitation revoked; `false` if it was not pending
    pub async fn revoke(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE invitations SET revoked_at = NOW()
             WHERE id = $1 AND accepted_at IS NULL AND revoked_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Marks the invitation accepted; `false` if it was used, revoked or
    /// expired in the meantime
    pub async fn mark_accepted<'e, E>(executor: E, id: Uuid) -> Result<bool, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let result = sqlx::query(
            "UPDATE invitations SET accepted_at = NOW()
             WHERE id = $1 AND accepted_at IS NULL AND revoked_at IS NULL AND expires_at > NOW()",
        )
        .bind(id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invitation() -> Invitation {
        Invitation {
            id: Uuid::new_v4(),
            kind: InvitationKind::User,
            email: "new@example.com".to_string(),
            token_hash: "x".repeat(64),
            role: UserRole::User,
            invited_by: Some(Uuid::new_v4()),
            expires_at: Utc::now() + Duration::hours(72),
            accepted_at: None,
            revoked_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_granted_roles() {
        assert_eq!(InvitationKind::Admin.granted_role(), UserRole::Admin);
        assert_eq!(InvitationKind::User.granted_role(), UserRole::User);
    }

    #[test]
    fn test_state_precedence() {
        let now = Utc::now();
        let pending = invitation();
        assert_eq!(pending.state_at(now), InvitationState::Pending);
        assert_eq!(
            pending.state_at(now + Duration::hours(73)),
            InvitationState::Expired
        );

        let revoked = Invitation {
            revoked_at: Some(now),
            ..invitation()
        };
        assert_eq!(revoked.state_at(now), InvitationState::Revoked);

        let accepted = Invitation {
            accepted_at: Some(now),
            revoked_at: Some(now),
            ..invitation()
        };
        assert_eq!(accepted.state_at(now), InvitationState::Accepted);
    }

    #[test]
    fn test_token_hash_not_serialized() {
        let json = serde_json::to_value(invitation()).unwrap();
        assert!(json.get("token_hash").is_none());
        assert_eq!(json["kind"], "user");
    }
}
