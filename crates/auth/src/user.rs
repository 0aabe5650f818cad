use chrono::{DateTime, Utc};

use fittrack_core::{DomainError, DomainResult, Entity, UserId};

use crate::{PasswordHash, Role};

/// Stored user account. The password is only ever held as a bcrypt digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    pub id: UserId,
    pub name: Option<String>,
    pub surname: Option<String>,
    pub nick_name: Option<String>,
    pub email: String,
    pub age: Option<i32>,
    pub role: Role,
    pub password_hash: PasswordHash,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Entity for UserAccount {
    type Id = UserId;

    fn id(&self) -> UserId {
        self.id
    }

    fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Validated registration data, ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub password_hash: PasswordHash,
    pub role: Role,
    pub name: Option<String>,
    pub surname: Option<String>,
    pub nick_name: Option<String>,
    pub age: Option<i32>,
}

/// Partial update applied by an administrator. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub nick_name: Option<String>,
    pub age: Option<i32>,
    pub role: Option<Role>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.surname.is_none()
            && self.nick_name.is_none()
            && self.age.is_none()
            && self.role.is_none()
    }

    pub fn validate(&self) -> DomainResult<()> {
        if let Some(age) = self.age {
            validate_age(age)?;
        }
        Ok(())
    }

    pub fn apply_to(&self, account: &mut UserAccount, now: DateTime<Utc>) {
        if let Some(name) = &self.name {
            account.name = Some(name.clone());
        }
        if let Some(surname) = &self.surname {
            account.surname = Some(surname.clone());
        }
        if let Some(nick_name) = &self.nick_name {
            account.nick_name = Some(nick_name.clone());
        }
        if let Some(age) = self.age {
            account.age = Some(age);
        }
        if let Some(role) = self.role {
            account.role = role;
        }
        account.updated_at = now;
    }
}

/// Trim + lowercase, then a structural sanity check (`local@domain.tld`).
pub fn normalize_email(raw: &str) -> DomainResult<String> {
    let email = raw.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };

    if valid {
        Ok(email)
    } else {
        Err(DomainError::validation("a valid email is required"))
    }
}

pub fn validate_age(age: i32) -> DomainResult<()> {
    if (0..=150).contains(&age) {
        Ok(())
    } else {
        Err(DomainError::validation("age must be between 0 and 150"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn epoch() -> DateTime<Utc> {
        Utc.timestamp_opt(0, 0).unwrap()
    }

    fn account() -> UserAccount {
        let at = epoch();
        UserAccount {
            id: UserId::new(1),
            name: Some("Ann".into()),
            surname: None,
            nick_name: Some("annie".into()),
            email: "ann@example.com".into(),
            age: Some(30),
            role: Role::User,
            password_hash: PasswordHash::from_digest("$2b$04$digest"),
            created_at: at,
            updated_at: at,
            deleted_at: None,
        }
    }

    #[test]
    fn email_is_normalized() {
        assert_eq!(normalize_email("  Ann@Example.COM ").unwrap(), "ann@example.com");
    }

    #[test]
    fn malformed_emails_are_rejected() {
        for raw in ["", "ann", "@example.com", "ann@", "ann@example", "a@b@c.d", "an n@example.com", "ann@.com"] {
            assert!(normalize_email(raw).is_err(), "{raw} should be rejected");
        }
    }

    #[test]
    fn empty_patch_is_detected() {
        assert!(UserPatch::default().is_empty());
        let patch = UserPatch {
            role: Some(Role::Admin),
            ..UserPatch::default()
        };
        assert!(!patch.is_empty());
    }

    #[test]
    fn patch_touches_only_given_fields() {
        let mut user = account();
        let later = epoch() + chrono::Duration::days(1);
        UserPatch {
            surname: Some("Smith".into()),
            age: Some(31),
            ..UserPatch::default()
        }
        .apply_to(&mut user, later);

        assert_eq!(user.name.as_deref(), Some("Ann"));
        assert_eq!(user.surname.as_deref(), Some("Smith"));
        assert_eq!(user.age, Some(31));
        assert_eq!(user.role, Role::User);
        assert_eq!(user.updated_at, later);
    }

    #[test]
    fn negative_age_is_invalid() {
        let patch = UserPatch {
            age: Some(-1),
            ..UserPatch::default()
        };
        assert!(patch.validate().is_err());
        assert!(validate_age(0).is_ok());
    }
}
