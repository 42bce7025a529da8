//! Bank API server entry point.
//!
//! # Startup Flow
//!
//! 1. Initialize logging from `RUST_LOG`
//! 2. Load configuration from environment variables
//! 3. Create the database pool and run migrations
//! 4. Build the router: handlers, then chaos injection, then idempotency
//!    caching, then request tracing and the request deadline
//! 5. Serve until SIGINT/SIGTERM, then drain for up to 30 seconds

use std::sync::Arc;
use std::time::Duration;

use axum::middleware as axum_middleware;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use mockbank::config::Config;
use mockbank::db;
use mockbank::handlers::{self, AppState};
use mockbank::middleware::chaos::{self, ChaosConfig};
use mockbank::middleware::idempotency::{self, IdempotencyState};
use mockbank::services::{
    AuthorizationService, CaptureService, PgHealthChecker, RefundService, VoidService,
};
use mockbank::store::idempotency::PgIdempotencyStore;

/// How long in-flight requests get to finish after a shutdown signal.
const SHUTDOWN_DRAIN: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env()?;
    tracing::info!(port = config.port, "configuration loaded");

    let pool = db::create_pool(&config).await?;
    tracing::info!(
        max_connections = config.db_max_connections,
        "database pool created"
    );

    db::run_migrations(&pool).await?;
    tracing::info!("database migrations complete");

    let state = AppState {
        authorizer: Arc::new(AuthorizationService::new(
            pool.clone(),
            config.auth_expiry_hours,
        )),
        capturer: Arc::new(CaptureService::new(pool.clone())),
        voider: Arc::new(VoidService::new(pool.clone())),
        refunder: Arc::new(RefundService::new(pool.clone())),
        health: Arc::new(PgHealthChecker::new(pool.clone())),
    };

    let chaos_config = ChaosConfig {
        failure_rate: config.failure_rate,
        min_latency_ms: config.min_latency_ms,
        max_latency_ms: config.max_latency_ms,
    };

    let idempotency_state = IdempotencyState {
        store: Arc::new(PgIdempotencyStore::new(pool.clone())),
    };

    // Layer order: later layers are outermost. Idempotency wraps chaos so
    // injected 500s never land in the replay cache.
    let app = handlers::router(state)
        .layer(axum_middleware::from_fn_with_state(
            chaos_config,
            chaos::failure_injection,
        ))
        .layer(axum_middleware::from_fn_with_state(
            idempotency_state,
            idempotency::idempotency,
        ))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server_write_timeout_secs,
        )))
        .layer(TraceLayer::new_for_http());

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "server listening");

    // Relay SIGINT/SIGTERM through a watch channel: one receiver starts the
    // graceful drain, the other arms the drain deadline.
    let (shutdown_tx, mut shutdown_rx) = tokio::sync::watch::channel(());
    tokio::spawn(async move {
        shutdown_signal().await;
        tracing::info!("shutting down server...");
        let _ = shutdown_tx.send(());
    });

    let mut drain_rx = shutdown_rx.clone();
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        let _ = shutdown_rx.changed().await;
    });

    tokio::select! {
        result = server => result?,
        _ = async {
            let _ = drain_rx.changed().await;
            tokio::time::sleep(SHUTDOWN_DRAIN).await;
        } => {
            tracing::warn!(
                drain_secs = SHUTDOWN_DRAIN.as_secs(),
                "drain window elapsed, aborting open connections"
            );
        }
    }

    tracing::info!("server stopped");
    Ok(())
}

/// Resolve when SIGINT or SIGTERM arrives.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install SIGINT handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
