//! Role-gated field projection for user records.
//!
//! Which attributes a caller sees is a pure function of the view being served
//! and the caller's role, captured in one declarative table.

use serde_json::{Map, Value};

use crate::{Role, UserAccount};

/// Which kind of read is being served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserView {
    /// A single user: own profile or lookup by id.
    Profile,
    /// The user listing.
    Directory,
}

/// A projectable user attribute. The password hash deliberately has no variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserField {
    Id,
    Name,
    Surname,
    NickName,
    Email,
    Age,
    Role,
    CreatedAt,
    UpdatedAt,
}

impl UserField {
    /// JSON key used in responses.
    pub fn key(&self) -> &'static str {
        match self {
            UserField::Id => "id",
            UserField::Name => "name",
            UserField::Surname => "surname",
            UserField::NickName => "nickName",
            UserField::Email => "email",
            UserField::Age => "age",
            UserField::Role => "role",
            UserField::CreatedAt => "createdAt",
            UserField::UpdatedAt => "updatedAt",
        }
    }

    fn value_of(&self, account: &UserAccount) -> Value {
        match self {
            UserField::Id => Value::from(account.id.get()),
            UserField::Name => opt_string(&account.name),
            UserField::Surname => opt_string(&account.surname),
            UserField::NickName => opt_string(&account.nick_name),
            UserField::Email => Value::from(account.email.clone()),
            UserField::Age => account.age.map(Value::from).unwrap_or(Value::Null),
            UserField::Role => Value::from(account.role.as_str()),
            UserField::CreatedAt => Value::from(account.created_at.to_rfc3339()),
            UserField::UpdatedAt => Value::from(account.updated_at.to_rfc3339()),
        }
    }
}

fn opt_string(value: &Option<String>) -> Value {
    value.clone().map(Value::from).unwrap_or(Value::Null)
}

const ALL_FIELDS: &[UserField] = &[
    UserField::Id,
    UserField::Name,
    UserField::Surname,
    UserField::NickName,
    UserField::Email,
    UserField::Age,
    UserField::Role,
    UserField::CreatedAt,
    UserField::UpdatedAt,
];

const VISIBILITY: &[(UserView, Role, &[UserField])] = &[
    (UserView::Profile, Role::Admin, ALL_FIELDS),
    (
        UserView::Profile,
        Role::User,
        &[UserField::Name, UserField::Surname, UserField::Age, UserField::NickName],
    ),
    (UserView::Directory, Role::Admin, ALL_FIELDS),
    (UserView::Directory, Role::User, &[UserField::Id, UserField::NickName]),
];

/// Fields visible to `role` in `view`. Unlisted combinations see nothing.
pub fn visible_fields(view: UserView, role: Role) -> &'static [UserField] {
    VISIBILITY
        .iter()
        .find(|(v, r, _)| *v == view && *r == role)
        .map(|(_, _, fields)| *fields)
        .unwrap_or(&[])
}

/// Project `account` down to what `role` may see in `view`.
pub fn project_user(account: &UserAccount, view: UserView, role: Role) -> Map<String, Value> {
    visible_fields(view, role)
        .iter()
        .map(|field| (field.key().to_string(), field.value_of(account)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PasswordHash;
    use chrono::{TimeZone, Utc};
    use fittrack_core::UserId;

    fn account() -> UserAccount {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        UserAccount {
            id: UserId::new(5),
            name: Some("Ann".into()),
            surname: Some("Lee".into()),
            nick_name: Some("annie".into()),
            email: "ann@example.com".into(),
            age: None,
            role: Role::User,
            password_hash: PasswordHash::from_digest("$2b$04$secretdigest"),
            created_at: at,
            updated_at: at,
            deleted_at: None,
        }
    }

    fn keys(map: &Map<String, Value>) -> Vec<&str> {
        let mut keys: Vec<&str> = map.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    #[test]
    fn user_profile_is_restricted() {
        let projected = project_user(&account(), UserView::Profile, Role::User);
        assert_eq!(keys(&projected), vec!["age", "name", "nickName", "surname"]);
        assert_eq!(projected["age"], Value::Null);
    }

    #[test]
    fn user_directory_is_id_and_nickname() {
        let projected = project_user(&account(), UserView::Directory, Role::User);
        assert_eq!(keys(&projected), vec!["id", "nickName"]);
        assert_eq!(projected["id"], 5);
    }

    #[test]
    fn admin_sees_everything_but_the_password() {
        for view in [UserView::Profile, UserView::Directory] {
            let projected = project_user(&account(), view, Role::Admin);
            assert_eq!(projected.len(), ALL_FIELDS.len());
            assert_eq!(projected["email"], "ann@example.com");
            assert_eq!(projected["role"], "USER");
            let rendered = Value::Object(projected).to_string();
            assert!(!rendered.contains("secretdigest"));
            assert!(!rendered.contains("password"));
        }
    }
}
