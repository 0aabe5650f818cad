//! `fittrack-auth` — authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: it knows how to
//! hash passwords, mint and verify tokens, and decide what a principal may see
//! or change, but not where users are stored or how requests arrive.

pub mod authorize;
pub mod claims;
pub mod password;
pub mod principal;
pub mod roles;
pub mod user;
pub mod visibility;

pub use authorize::{authorize_user_read, require_role, AuthzError};
pub use claims::{validate_claims, JwtCodec, TokenClaims, TokenError, TokenValidationError};
pub use password::{hash_password, verify_password, PasswordError, PasswordHash, DEFAULT_COST};
pub use principal::Principal;
pub use roles::Role;
pub use user::{normalize_email, validate_age, NewUser, UserAccount, UserPatch};
pub use visibility::{project_user, visible_fields, UserField, UserView};
