use thiserror::Error;

use fittrack_core::UserId;

use crate::{Principal, Role};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: requires role {0}")]
    RoleRequired(Role),

    #[error("forbidden: cannot access another user's data")]
    NotOwner,
}

/// Pure role check. No IO, no panics.
pub fn require_role(principal: &Principal, required: Role) -> Result<(), AuthzError> {
    if principal.role.grants(required) {
        Ok(())
    } else {
        Err(AuthzError::RoleRequired(required))
    }
}

/// Admins may read any user; everyone else only themselves.
///
/// Decided before any lookup, so a denial never reveals whether `target` exists.
pub fn authorize_user_read(principal: &Principal, target: UserId) -> Result<(), AuthzError> {
    if principal.is_admin() || principal.user_id == target {
        Ok(())
    } else {
        Err(AuthzError::NotOwner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(id: i64, role: Role) -> Principal {
        Principal {
            user_id: UserId::new(id),
            email: format!("u{id}@example.com"),
            role,
        }
    }

    #[test]
    fn user_cannot_act_as_admin() {
        let user = principal(1, Role::User);
        assert_eq!(require_role(&user, Role::Admin), Err(AuthzError::RoleRequired(Role::Admin)));
        assert!(require_role(&user, Role::User).is_ok());
        assert!(require_role(&principal(2, Role::Admin), Role::Admin).is_ok());
    }

    #[test]
    fn user_reads_only_self() {
        let user = principal(1, Role::User);
        assert!(authorize_user_read(&user, UserId::new(1)).is_ok());
        assert_eq!(authorize_user_read(&user, UserId::new(2)), Err(AuthzError::NotOwner));
        assert_eq!(authorize_user_read(&user, UserId::new(999_999)), Err(AuthzError::NotOwner));
    }

    #[test]
    fn admin_reads_anyone() {
        let admin = principal(1, Role::Admin);
        assert!(authorize_user_read(&admin, UserId::new(42)).is_ok());
    }
}
