//! HTTP handlers and router assembly.

pub mod authorizations;
pub mod captures;
pub mod docs;
pub mod health;
pub mod ids;
pub mod refunds;
pub mod voids;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::services::{Authorizer, Capturer, HealthChecker, Refunder, Voider};

/// Shared handler state: the five service capabilities behind trait
/// objects, so tests can swap in stubs.
#[derive(Clone)]
pub struct AppState {
    pub authorizer: Arc<dyn Authorizer>,
    pub capturer: Arc<dyn Capturer>,
    pub voider: Arc<dyn Voider>,
    pub refunder: Arc<dyn Refunder>,
    pub health: Arc<dyn HealthChecker>,
}

/// Build the API router. Middleware is layered on by the caller.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(docs::root_redirect))
        .route("/docs", get(docs::swagger_ui))
        .route("/docs/openapi", get(docs::openapi_spec))
        .route("/health", get(health::health_check))
        .route(
            "/api/v1/authorizations",
            post(authorizations::create_authorization),
        )
        .route(
            "/api/v1/authorizations/{id}",
            get(authorizations::get_authorization),
        )
        .route("/api/v1/captures", post(captures::create_capture))
        .route("/api/v1/captures/{id}", get(captures::get_capture))
        .route("/api/v1/voids", post(voids::create_void))
        .route("/api/v1/refunds", post(refunds::create_refund))
        .route("/api/v1/refunds/{id}", get(refunds::get_refund))
        .with_state(state)
}
