use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tracing::debug;

use crate::app::errors::ApiError;
use crate::app::AppServices;
use crate::context::CurrentUser;
use crate::cookies::{get_cookie_value, AUTH_COOKIE};

/// Cookie authentication for protected routes.
///
/// The token must verify and its `userId` must resolve to a live account with
/// the same email; otherwise the request stops here with 401.
pub async fn require_auth(
    State(services): State<Arc<AppServices>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = get_cookie_value(req.headers(), AUTH_COOKIE)
        .filter(|t| !t.is_empty())
        .ok_or(ApiError::AuthenticationRequired)?;

    let claims = services
        .tokens
        .verify(&token, Utc::now())
        .map_err(|_| ApiError::InvalidToken)?;

    let account = services
        .store
        .find_user(claims.user_id)
        .await?
        .filter(|account| account.email == claims.email)
        .ok_or_else(|| {
            debug!(user_id = %claims.user_id, "token subject no longer matches a live account");
            ApiError::InvalidToken
        })?;

    req.extensions_mut().insert(CurrentUser::new(account));
    Ok(next.run(req).await)
}
