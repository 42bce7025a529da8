//! Idempotent request caching middleware.
//!
//! POSTs to the mutating payment endpoints that carry an `Idempotency-Key`
//! header are cached: the first 2xx response is stored, and any retry with
//! the same key and path replays the stored status and body bytes without
//! invoking the handler. Cache failures in either direction fail open - a
//! broken cache degrades to at-least-once HTTP semantics, and the database
//! uniqueness index remains the at-most-once backstop for money movement.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use chrono::Utc;

use crate::models::IdempotencyRecord;
use crate::store::idempotency::IdempotencyStore;

const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";
const REPLAYED_HEADER: &str = "X-Idempotent-Replayed";

/// Paths that require idempotency handling. Only mutating POSTs qualify.
const IDEMPOTENT_PATHS: [&str; 4] = [
    "/api/v1/authorizations",
    "/api/v1/captures",
    "/api/v1/voids",
    "/api/v1/refunds",
];

/// State handed to the middleware: the response cache.
#[derive(Clone)]
pub struct IdempotencyState {
    pub store: Arc<dyn IdempotencyStore>,
}

/// Idempotency middleware entry point.
pub async fn idempotency(
    State(state): State<IdempotencyState>,
    request: Request,
    next: Next,
) -> Response {
    if !requires_idempotency(request.method(), request.uri().path()) {
        return next.run(request).await;
    }

    let Some(key) = request
        .headers()
        .get(IDEMPOTENCY_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
    else {
        // Without a key there is nothing to replay against.
        return next.run(request).await;
    };

    let request_path = normalize_request_path(request.uri().path()).to_owned();

    match state.store.get(&key, &request_path).await {
        Ok(Some(cached)) => {
            tracing::debug!(
                key = %key,
                path = %request_path,
                status = cached.response_status,
                "returning cached idempotent response"
            );
            return replay_response(&cached);
        }
        Ok(None) => {}
        Err(err) => {
            // Fail open: serve the request, skip caching this round.
            tracing::error!(error = %err, "failed to check idempotency cache");
            return next.run(request).await;
        }
    }

    let response = next.run(request).await;
    let (parts, body) = response.into_parts();

    let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::error!(error = %err, "failed to buffer response body");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    if parts.status.is_success() {
        let record = IdempotencyRecord {
            key,
            request_path,
            response_status: i32::from(parts.status.as_u16()),
            response_body: body_bytes.to_vec(),
            created_at: Utc::now(),
        };

        if let Err(err) = state.store.put(&record).await {
            tracing::error!(error = %err, key = %record.key, "failed to store idempotency key");
        }
    }

    Response::from_parts(parts, Body::from(body_bytes))
}

fn requires_idempotency(method: &Method, path: &str) -> bool {
    method == Method::POST && IDEMPOTENT_PATHS.contains(&path)
}

fn normalize_request_path(path: &str) -> &str {
    path.trim_end_matches('/')
}

fn replay_response(cached: &IdempotencyRecord) -> Response {
    let status = StatusCode::from_u16(cached.response_status as u16)
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let mut response = Response::new(Body::from(cached.response_body.clone()));
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    response
        .headers_mut()
        .insert(REPLAYED_HEADER, HeaderValue::from_static("true"));
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_on_payment_paths_requires_idempotency() {
        for path in IDEMPOTENT_PATHS {
            assert!(requires_idempotency(&Method::POST, path));
        }
    }

    #[test]
    fn reads_and_unknown_paths_bypass() {
        assert!(!requires_idempotency(&Method::GET, "/api/v1/authorizations"));
        assert!(!requires_idempotency(&Method::POST, "/api/v1/other"));
        assert!(!requires_idempotency(&Method::POST, "/health"));
    }

    #[test]
    fn normalization_strips_trailing_slashes() {
        assert_eq!(normalize_request_path("/api/v1/voids/"), "/api/v1/voids");
        assert_eq!(normalize_request_path("/api/v1/voids"), "/api/v1/voids");
    }
}
