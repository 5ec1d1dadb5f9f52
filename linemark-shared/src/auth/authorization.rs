//! Authorization decision table
//!
//! All checks are pure functions over the authenticated actor and the
//! target; handlers load what they need and call in here before writing.
//!
//! | Rule            | Applies to                           | Outcome                      |
//! |-----------------|--------------------------------------|------------------------------|
//! | admin area      | `/api/admin/*`                       | role ≥ `admin`               |
//! | resource        | sportsgrounds, configurations, bookings | owner, or role ≥ `admin`  |
//! | self-protection | role change, suspend, delete         | never on own account         |
//! | hierarchy       | any action on another account        | target rank < actor rank     |
//! | grant           | role change, invitations             | granted rank < actor rank    |
//!
//! Consequently admins manage plain users only, and only super admins can
//! create or manage admins.

use uuid::Uuid;

use super::middleware::AuthContext;
use crate::models::user::UserRole;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    #[error("Administrator access required")]
    AdminRequired,

    #[error("Not authorized to access this resource")]
    NotOwner,

    #[error("You cannot {0} your own account")]
    SelfModification(&'static str),

    #[error("Cannot manage an account with role {target}")]
    TargetOutranksActor { target: UserRole },

    #[error("Cannot grant role {role}")]
    CannotGrantRole { role: UserRole },
}

/// Administrative actions on another account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountAction {
    ChangeRole(UserRole),
    SetSuspended(bool),
    SetVerified(bool),
    Delete,
}

impl AccountAction {
    fn verb(&self) -> &'static str {
        match self {
            AccountAction::ChangeRole(_) => "change the role of",
            AccountAction::SetSuspended(true) => "suspend",
            AccountAction::SetSuspended(false) => "unsuspend",
            AccountAction::SetVerified(_) => "change verification of",
            AccountAction::Delete => "delete",
        }
    }
}

pub fn require_admin(actor: &AuthContext) -> Result<(), AuthzError> {
    if !actor.role.is_admin() {
        return Err(AuthzError::AdminRequired);
    }
    Ok(())
}

/// Owner of the resource, or any admin
pub fn require_owner_or_admin(actor: &AuthContext, owner_id: Uuid) -> Result<(), AuthzError> {
    if actor.user_id == owner_id || actor.role.is_admin() {
        return Ok(());
    }
    Err(AuthzError::NotOwner)
}

/// Strict ownership, for actions admins do not take on a user's behalf
pub fn require_owner(actor: &AuthContext, owner_id: Uuid) -> Result<(), AuthzError> {
    if actor.user_id != owner_id {
        return Err(AuthzError::NotOwner);
    }
    Ok(())
}

/// Actor may hand out `role` (by role change or invitation)
pub fn require_can_grant(actor: &AuthContext, role: UserRole) -> Result<(), AuthzError> {
    if role >= actor.role {
        return Err(AuthzError::CannotGrantRole { role });
    }
    Ok(())
}

/// Full check for an admin acting on another account
pub fn authorize_account_action(
    actor: &AuthContext,
    target_id: Uuid,
    target_role: UserRole,
    action: AccountAction,
) -> Result<(), AuthzError> {
    require_admin(actor)?;

    if actor.user_id == target_id {
        return Err(AuthzError::SelfModification(action.verb()));
    }
    if target_role >= actor.role {
        return Err(AuthzError::TargetOutranksActor {
            target: target_role,
        });
    }
    if let AccountAction::ChangeRole(role) = action {
        require_can_grant(actor, role)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(role: UserRole) -> AuthContext {
        AuthContext {
            user_id: Uuid::new_v4(),
            email: "actor@example.com".to_string(),
            role,
        }
    }

    #[test]
    fn test_admin_area() {
        assert!(require_admin(&actor(UserRole::User)).is_err());
        assert!(require_admin(&actor(UserRole::Admin)).is_ok());
        assert!(require_admin(&actor(UserRole::SuperAdmin)).is_ok());
    }

    #[test]
    fn test_resource_owner_or_admin() {
        let user = actor(UserRole::User);
        assert!(require_owner_or_admin(&user, user.user_id).is_ok());
        assert_eq!(
            require_owner_or_admin(&user, Uuid::new_v4()),
            Err(AuthzError::NotOwner)
        );
        assert!(require_owner_or_admin(&actor(UserRole::Admin), Uuid::new_v4()).is_ok());
        assert!(require_owner(&actor(UserRole::Admin), Uuid::new_v4()).is_err());
    }

    #[test]
    fn test_self_protection() {
        let admin = actor(UserRole::SuperAdmin);
        for action in [
            AccountAction::ChangeRole(UserRole::User),
            AccountAction::SetSuspended(true),
            AccountAction::Delete,
        ] {
            let err = authorize_account_action(&admin, admin.user_id, admin.role, action)
                .unwrap_err();
            assert!(matches!(err, AuthzError::SelfModification(_)));
        }
        assert_eq!(
            AuthzError::SelfModification(AccountAction::Delete.verb()).to_string(),
            "You cannot delete your own account"
        );
    }

    #[test]
    fn test_hierarchy() {
        let admin = actor(UserRole::Admin);
        let other = Uuid::new_v4();

        assert!(authorize_account_action(&admin, other, UserRole::User, AccountAction::Delete).is_ok());
        assert_eq!(
            authorize_account_action(&admin, other, UserRole::Admin, AccountAction::Delete),
            Err(AuthzError::TargetOutranksActor {
                target: UserRole::Admin
            })
        );
        assert!(authorize_account_action(
            &admin,
            other,
            UserRole::SuperAdmin,
            AccountAction::SetSuspended(true)
        )
        .is_err());

        let super_admin = actor(UserRole::SuperAdmin);
        assert!(authorize_account_action(
            &super_admin,
            other,
            UserRole::Admin,
            AccountAction::SetSuspended(true)
        )
        .is_ok());
        assert!(authorize_account_action(
            &super_admin,
            other,
            UserRole::SuperAdmin,
            AccountAction::Delete
        )
        .is_err());
    }

    #[test]
    fn test_granting_roles() {
        let admin = actor(UserRole::Admin);
        let super_admin = actor(UserRole::SuperAdmin);
        let other = Uuid::new_v4();

        // admins cannot promote users to admin
        assert_eq!(
            authorize_account_action(
                &admin,
                other,
                UserRole::User,
                AccountAction::ChangeRole(UserRole::Admin)
            ),
            Err(AuthzError::CannotGrantRole {
                role: UserRole::Admin
            })
        );
        assert!(authorize_account_action(
            &super_admin,
            other,
            UserRole::User,
            AccountAction::ChangeRole(UserRole::Admin)
        )
        .is_ok());
        assert!(require_can_grant(&super_admin, UserRole::SuperAdmin).is_err());
        assert!(require_can_grant(&admin, UserRole::User).is_ok());
    }

    #[test]
    fn test_plain_users_cannot_manage_accounts() {
        let user = actor(UserRole::User);
        assert_eq!(
            authorize_account_action(&user, Uuid::new_v4(), UserRole::User, AccountAction::Delete),
            Err(AuthzError::AdminRequired)
        );
    }
}
