//! Health check endpoint for service monitoring.

use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::handlers::AppState;

/// Health check handler.
///
/// Pings the database with a 2-second deadline; an unreachable or slow
/// database reports 503 so load balancers rotate the instance out.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    match tokio::time::timeout(Duration::from_secs(2), state.health.ping()).await {
        Ok(Ok(())) => (StatusCode::OK, Json(json!({ "status": "healthy" }))),
        Ok(Err(err)) => {
            tracing::error!(error = %err, "health check failed: database unreachable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unhealthy" })),
            )
        }
        Err(_) => {
            tracing::error!("health check failed: database ping timed out");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unhealthy" })),
            )
        }
    }
}
