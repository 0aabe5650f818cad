use fittrack_auth::{Principal, Role, UserAccount};
use fittrack_core::UserId;

/// The authenticated caller for a request, inserted by the auth middleware.
///
/// Holds the live account as loaded during authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    principal: Principal,
    account: UserAccount,
}

impl CurrentUser {
    pub fn new(account: UserAccount) -> Self {
        Self {
            principal: Principal::from_account(&account),
            account,
        }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn account(&self) -> &UserAccount {
        &self.account
    }

    pub fn user_id(&self) -> UserId {
        self.principal.user_id
    }

    pub fn role(&self) -> Role {
        self.principal.role
    }
}
