//! HTTP application wiring (Axum router + shared services).
//!
//! - `routes/`: handlers, one file per resource
//! - `dto.rs`: request bodies and response envelopes
//! - `errors.rs`: error taxonomy and its JSON mapping

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use chrono::Duration;
use tower::{Layer, ServiceBuilder};
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use fittrack_auth::JwtCodec;
use fittrack_infra::FitnessStore;

use crate::config::ApiConfig;
use crate::cookies::CookieSettings;

pub mod dto;
pub mod errors;
pub mod routes;

/// Shared, read-only state handed to every handler.
pub struct AppServices {
    pub store: Arc<dyn FitnessStore>,
    pub tokens: JwtCodec,
    pub token_ttl: Duration,
    pub bcrypt_cost: u32,
    pub cookies: CookieSettings,
}

impl AppServices {
    pub fn new(store: Arc<dyn FitnessStore>, config: &ApiConfig) -> Self {
        Self {
            store,
            tokens: JwtCodec::new(config.jwt_secret.as_bytes()),
            token_ttl: Duration::seconds(config.token_ttl_secs),
            bcrypt_cost: config.bcrypt_cost,
            cookies: CookieSettings {
                secure: config.cookie_secure,
                max_age_secs: config.token_ttl_secs,
            },
        }
    }
}

/// The router as served: a trailing slash is trimmed before routing, so
/// `/users/` and `/users` reach the same handler.
pub fn build_service(services: Arc<AppServices>) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(build_app(services))
}

/// Build the full HTTP router.
pub fn build_app(services: Arc<AppServices>) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/users", routes::users::router(services.clone()))
        .nest("/programs", routes::programs::router(services.clone()))
        .nest("/exercises", routes::exercises::router(services.clone()))
        .nest("/tracking", routes::tracking::router(services.clone()))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                        .on_response(DefaultOnResponse::new().level(Level::INFO)),
                )
                .layer(Extension(services)),
        )
}
