use fittrack_core::UserId;

use crate::{Role, UserAccount};

/// An authenticated caller, resolved from a verified token and a live account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
    pub email: String,
    pub role: Role,
}

impl Principal {
    pub fn from_account(account: &UserAccount) -> Self {
        Self {
            user_id: account.id,
            email: account.email.clone(),
            role: account.role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
