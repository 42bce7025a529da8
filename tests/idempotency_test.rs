//! Idempotency middleware tests against an in-memory store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::middleware as axum_middleware;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower::ServiceExt;

use mockbank::middleware::idempotency::{self, IdempotencyState};
use mockbank::models::IdempotencyRecord;
use mockbank::store::idempotency::IdempotencyStore;

/// In-memory stand-in for the Postgres store.
#[derive(Default)]
struct InMemoryStore {
    records: Mutex<HashMap<(String, String), IdempotencyRecord>>,
    fail_get: bool,
}

impl InMemoryStore {
    fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

#[async_trait]
impl IdempotencyStore for InMemoryStore {
    async fn get(
        &self,
        key: &str,
        request_path: &str,
    ) -> Result<Option<IdempotencyRecord>, sqlx::Error> {
        if self.fail_get {
            return Err(sqlx::Error::PoolTimedOut);
        }

        let records = self.records.lock().unwrap();
        Ok(records
            .get(&(key.to_string(), request_path.to_string()))
            .cloned())
    }

    async fn put(&self, record: &IdempotencyRecord) -> Result<(), sqlx::Error> {
        let mut records = self.records.lock().unwrap();
        // First write wins, like ON CONFLICT DO NOTHING.
        records
            .entry((record.key.clone(), record.request_path.clone()))
            .or_insert_with(|| record.clone());
        Ok(())
    }
}

/// Build an app with a call-counting 200 handler on the authorizations
/// path, a 200 handler on voids, and a 400 handler on captures.
fn test_app(store: Arc<InMemoryStore>, calls: Arc<AtomicUsize>) -> Router {
    let ok_handler = move || {
        let calls = calls.clone();
        async move {
            let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
            Json(json!({ "call": call }))
        }
    };

    Router::new()
        .route("/api/v1/authorizations", post(ok_handler.clone()))
        .route("/api/v1/authorizations", get(|| async { "listing" }))
        .route("/api/v1/voids", post(ok_handler))
        .route(
            "/api/v1/captures",
            post(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": "authorization_not_found", "message": "nope" })),
                )
            }),
        )
        .layer(axum_middleware::from_fn_with_state(
            IdempotencyState { store },
            idempotency::idempotency,
        ))
}

fn post_request(uri: &str, key: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri(uri);
    if let Some(key) = key {
        builder = builder.header("Idempotency-Key", key);
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

#[tokio::test]
async fn replay_returns_the_original_response() {
    let store = Arc::new(InMemoryStore::default());
    let calls = Arc::new(AtomicUsize::new(0));

    let app = test_app(store.clone(), calls.clone());
    let first = app
        .oneshot(post_request("/api/v1/authorizations", Some("key-1")))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    assert!(first.headers().get("X-Idempotent-Replayed").is_none());
    let first_body = body_bytes(first).await;

    let app = test_app(store.clone(), calls.clone());
    let second = app
        .oneshot(post_request("/api/v1/authorizations", Some("key-1")))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(second.headers()["X-Idempotent-Replayed"], "true");
    assert_eq!(second.headers()["Content-Type"], "application/json");
    let second_body = body_bytes(second).await;

    // Byte-identical replay, and the handler ran exactly once.
    assert_eq!(first_body, second_body);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn missing_key_passes_through_uncached() {
    let store = Arc::new(InMemoryStore::default());
    let calls = Arc::new(AtomicUsize::new(0));

    for _ in 0..2 {
        let app = test_app(store.clone(), calls.clone());
        let response = app
            .oneshot(post_request("/api/v1/authorizations", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(store.len(), 0);
}

#[tokio::test]
async fn non_success_responses_are_not_cached() {
    let store = Arc::new(InMemoryStore::default());
    let calls = Arc::new(AtomicUsize::new(0));

    for _ in 0..2 {
        let app = test_app(store.clone(), calls.clone());
        let response = app
            .oneshot(post_request("/api/v1/captures", Some("cap-key")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.headers().get("X-Idempotent-Replayed").is_none());
        let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(body["error"], "authorization_not_found");
    }

    assert_eq!(store.len(), 0);
}

#[tokio::test]
async fn get_requests_bypass_the_cache() {
    let store = Arc::new(InMemoryStore::default());
    let calls = Arc::new(AtomicUsize::new(0));

    let app = test_app(store.clone(), calls.clone());
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/authorizations")
                .header("Idempotency-Key", "get-key")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(store.len(), 0);
}

#[tokio::test]
async fn same_key_on_different_paths_is_independent() {
    let store = Arc::new(InMemoryStore::default());
    let calls = Arc::new(AtomicUsize::new(0));

    let app = test_app(store.clone(), calls.clone());
    let auth = app
        .oneshot(post_request("/api/v1/authorizations", Some("shared-key")))
        .await
        .unwrap();
    assert!(auth.headers().get("X-Idempotent-Replayed").is_none());

    let app = test_app(store.clone(), calls.clone());
    let void = app
        .oneshot(post_request("/api/v1/voids", Some("shared-key")))
        .await
        .unwrap();
    // A record exists for the key, but under the other path: no replay.
    assert!(void.headers().get("X-Idempotent-Replayed").is_none());

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(store.len(), 2);
}

#[tokio::test]
async fn distinct_keys_both_execute() {
    let store = Arc::new(InMemoryStore::default());
    let calls = Arc::new(AtomicUsize::new(0));

    for key in ["key-a", "key-b"] {
        let app = test_app(store.clone(), calls.clone());
        let response = app
            .oneshot(post_request("/api/v1/authorizations", Some(key)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(store.len(), 2);
}

#[tokio::test]
async fn cache_read_failure_fails_open() {
    let store = Arc::new(InMemoryStore {
        fail_get: true,
        ..InMemoryStore::default()
    });
    let calls = Arc::new(AtomicUsize::new(0));

    for _ in 0..2 {
        let app = test_app(store.clone(), calls.clone());
        let response = app
            .oneshot(post_request("/api/v1/authorizations", Some("doomed-key")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get("X-Idempotent-Replayed").is_none());
    }

    // The handler ran every time and nothing was cached.
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(store.len(), 0);
}
