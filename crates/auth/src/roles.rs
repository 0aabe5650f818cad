use core::str::FromStr;

use serde::{Deserialize, Serialize};

use fittrack_core::DomainError;

/// Authorization tier of a user.
///
/// There are exactly two tiers: `Admin` may mutate the training catalog and
/// manage users; `User` may browse and track their own workouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::User => "USER",
        }
    }

    /// Whether holding `self` satisfies a requirement for `required`.
    pub fn grants(&self, required: Role) -> bool {
        matches!((self, required), (Role::Admin, _) | (Role::User, Role::User))
    }
}

impl FromStr for Role {
    type Err = DomainError;

    /// Case-insensitive: `"admin"`, `"Admin"` and `"ADMIN"` are all accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Role::Admin),
            "USER" => Ok(Role::User),
            _ => Err(DomainError::validation("role must be one of: ADMIN, USER")),
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("user".parse::<Role>().unwrap(), Role::User);
        assert_eq!(" Admin ".parse::<Role>().unwrap(), Role::Admin);
        assert!("owner".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
    }

    #[test]
    fn admin_grants_everything_user_only_itself() {
        assert!(Role::Admin.grants(Role::Admin));
        assert!(Role::Admin.grants(Role::User));
        assert!(Role::User.grants(Role::User));
        assert!(!Role::User.grants(Role::Admin));
    }

    #[test]
    fn serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"ADMIN\"");
        let role: Role = serde_json::from_str("\"USER\"").unwrap();
        assert_eq!(role, Role::User);
    }
}
