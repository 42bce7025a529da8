//! Failure injection middleware.
//!
//! Adds random latency and random 500s ahead of the handlers so client
//! applications can be tested for resilience. Health and docs endpoints
//! are exempt. Runs inside the idempotency layer, so an injected failure
//! is never cached and a retry with the same key performs the real work.

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rand::Rng;
use serde_json::json;

const EXCLUDED_PATHS: [&str; 2] = ["/health", "/docs"];

/// Chaos knobs, taken from `FAILURE_RATE` / `MIN_LATENCY_MS` /
/// `MAX_LATENCY_MS`.
#[derive(Debug, Clone)]
pub struct ChaosConfig {
    pub failure_rate: f64,
    pub min_latency_ms: u64,
    pub max_latency_ms: u64,
}

/// Failure injection middleware entry point.
pub async fn failure_injection(
    State(config): State<ChaosConfig>,
    request: Request,
    next: Next,
) -> Response {
    if is_excluded_path(request.uri().path()) {
        return next.run(request).await;
    }

    inject_latency(config.min_latency_ms, config.max_latency_ms).await;

    if should_inject_failure(config.failure_rate) {
        tracing::debug!(
            path = %request.uri().path(),
            method = %request.method(),
            "injecting random failure"
        );
        return failure_response();
    }

    next.run(request).await
}

fn is_excluded_path(path: &str) -> bool {
    EXCLUDED_PATHS
        .iter()
        .any(|excluded| path.starts_with(excluded))
}

/// Sleep a uniformly random duration in `[min_ms, max_ms]`.
async fn inject_latency(min_ms: u64, max_ms: u64) {
    if max_ms == 0 {
        return;
    }

    // ThreadRng is a CSPRNG seeded from the OS.
    let sleep_ms = if max_ms > min_ms {
        rand::thread_rng().gen_range(min_ms..=max_ms)
    } else {
        min_ms
    };

    if sleep_ms > 0 {
        tokio::time::sleep(std::time::Duration::from_millis(sleep_ms)).await;
    }
}

fn should_inject_failure(failure_rate: f64) -> bool {
    if failure_rate <= 0.0 {
        return false;
    }
    if failure_rate >= 1.0 {
        return true;
    }

    rand::random::<f64>() < failure_rate
}

fn failure_response() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "internal_error",
            "message": "Random failure injection",
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_and_docs_are_excluded() {
        assert!(is_excluded_path("/health"));
        assert!(is_excluded_path("/docs"));
        assert!(is_excluded_path("/docs/openapi"));

        assert!(!is_excluded_path("/api/v1/authorizations"));
        assert!(!is_excluded_path("/"));
    }

    #[test]
    fn failure_rate_extremes_are_deterministic() {
        assert!(!should_inject_failure(0.0));
        assert!(!should_inject_failure(-1.0));
        assert!(should_inject_failure(1.0));
        assert!(should_inject_failure(2.0));
    }
}
