use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::HeaderMap,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::Value;
use tracing::{info, warn};

use fittrack_auth::{
    authorize_user_read, hash_password, normalize_email, project_user, require_role, validate_age, verify_password,
    NewUser, PasswordError, PasswordHash, Role, UserPatch, UserView,
};
use fittrack_core::UserId;
use fittrack_infra::StoreError;

use crate::app::dto::{self, ApiJson};
use crate::app::errors::ApiError;
use crate::app::AppServices;
use crate::context::CurrentUser;
use crate::cookies;

pub fn router(services: Arc<AppServices>) -> Router {
    let public = Router::new()
        .route("/register", post(register))
        .route("/login", get(login).post(login))
        .route("/logout", get(logout).post(logout));

    let authenticated = Router::new()
        .route("/", get(list_users).patch(update_user))
        .route("/profile", get(profile))
        .route("/:id", get(get_user));

    public.merge(super::protected(authenticated, services))
}

fn parse_role(raw: &str) -> Result<Role, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::InvalidRole("Proper role is required (ADMIN or USER)".to_string()))
}

async fn hash_blocking(password: String, cost: u32) -> Result<PasswordHash, ApiError> {
    tokio::task::spawn_blocking(move || hash_password(&password, cost))
        .await
        .map_err(|e| ApiError::Internal(format!("hashing task failed: {e}")))?
        .map_err(ApiError::from)
}

async fn verify_blocking(password: String, hash: PasswordHash) -> Result<Result<bool, PasswordError>, ApiError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| ApiError::Internal(format!("password check task failed: {e}")))
}

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    ApiJson(body): ApiJson<dto::RegisterRequest>,
) -> Result<Json<Value>, ApiError> {
    let email = dto::required_text(body.email, "email")?;
    let password = dto::required(body.password.filter(|p| !p.is_empty()), "password")?;
    let role = parse_role(&dto::required_text(body.role, "role")?)?;
    let email = normalize_email(&email)?;
    if let Some(age) = body.age {
        validate_age(age)?;
    }

    if services.store.find_user_by_email(&email).await?.is_some() {
        info!(email = %email, "registration for an existing email");
        return Err(ApiError::AlreadyRegistered);
    }

    let password_hash = hash_blocking(password, services.bcrypt_cost).await?;
    let new_user = NewUser {
        email,
        password_hash,
        role,
        name: body.name,
        surname: body.surname,
        nick_name: body.nick_name,
        age: body.age,
    };

    match services.store.create_user(new_user).await {
        Ok(user) => {
            info!(user_id = %user.id, email = %user.email, role = %user.role, "user registered");
            Ok(dto::message("Successfully registered"))
        }
        // Lost a race with a concurrent registration of the same email.
        Err(StoreError::Conflict(_)) => Err(ApiError::AlreadyRegistered),
        Err(e) => Err(e.into()),
    }
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    ApiJson(body): ApiJson<dto::LoginRequest>,
) -> Result<Response, ApiError> {
    let email = dto::required_text(body.email, "email")?.trim().to_lowercase();
    let password = dto::required(body.password.filter(|p| !p.is_empty()), "password")?;

    let Some(user) = services.store.find_user_by_email(&email).await? else {
        info!(email = %email, "login for unknown email");
        return Err(ApiError::InvalidCredentials);
    };

    let matches = match verify_blocking(password, user.password_hash.clone()).await? {
        Ok(matches) => matches,
        Err(e) => {
            warn!(user_id = %user.id, error = %e, "stored password digest is unusable");
            false
        }
    };
    if !matches {
        info!(user_id = %user.id, "login with wrong password");
        return Err(ApiError::InvalidCredentials);
    }

    let token = services
        .tokens
        .issue(user.id, &user.email, services.token_ttl, Utc::now())?;

    let mut headers = HeaderMap::new();
    cookies::set_auth_cookie(&mut headers, &token, services.cookies);
    info!(user_id = %user.id, "user logged in");

    Ok((headers, dto::message("Successfully logged in")).into_response())
}

/// Clears the session cookie. The token itself stays valid until it expires.
pub async fn logout(Extension(services): Extension<Arc<AppServices>>) -> Response {
    let mut headers = HeaderMap::new();
    cookies::clear_auth_cookie(&mut headers, services.cookies);
    (headers, dto::message("User logged out")).into_response()
}

pub async fn profile(Extension(current): Extension<CurrentUser>) -> Result<Json<Value>, ApiError> {
    let projected = project_user(current.account(), UserView::Profile, current.role());
    dto::data(projected, "User profile")
}

pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id: UserId = id.parse()?;
    authorize_user_read(current.principal(), id)?;

    let user = services
        .store
        .find_user(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User with id {id} not found")))?;

    dto::data(project_user(&user, UserView::Profile, current.role()), "User")
}

pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Value>, ApiError> {
    let users: Vec<_> = services
        .store
        .list_users()
        .await?
        .iter()
        .map(|user| Value::Object(project_user(user, UserView::Directory, current.role())))
        .collect();

    dto::data(users, "Users")
}

pub async fn update_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    ApiJson(body): ApiJson<dto::UpdateUserRequest>,
) -> Result<Json<Value>, ApiError> {
    require_role(current.principal(), Role::Admin)?;

    let id = UserId::new(dto::required(body.id, "id")?);
    let patch = UserPatch {
        name: body.name,
        surname: body.surname,
        nick_name: body.nick_name,
        age: body.age,
        role: body.role.as_deref().map(parse_role).transpose()?,
    };
    patch.validate()?;

    if patch.is_empty() {
        return Ok(dto::message("User was not updated."));
    }

    let updated = services
        .store
        .update_user(id, &patch)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User with id {id} not found")))?;

    info!(user_id = %updated.id, by = %current.user_id(), "user updated");
    Ok(dto::message(format!("User with id {id} was updated")))
}
