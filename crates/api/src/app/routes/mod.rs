//! Route handlers, one module per resource.
//!
//! Each resource router keeps its public reads separate from the routes that
//! sit behind cookie authentication, then merges the two.

use std::sync::Arc;

use axum::{middleware, Router};

use crate::app::AppServices;

pub mod exercises;
pub mod programs;
pub mod system;
pub mod tracking;
pub mod users;

/// Put every route of `router` behind cookie authentication.
pub(crate) fn protected(router: Router, services: Arc<AppServices>) -> Router {
    router.route_layer(middleware::from_fn_with_state(services, crate::middleware::require_auth))
}
