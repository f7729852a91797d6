//! # docfs-api — Axum HTTP Surface for docfs
//!
//! Exposes the document catalog over HTTP: a namespace → project → document
//! hierarchy under `/files`, flat privileged listings, and raw downloads.
//!
//! ## API Surface
//!
//! | Prefix              | Module                  | Auth                  |
//! |---------------------|-------------------------|-----------------------|
//! | `/files/*`          | [`routes::files`]       | POST and DELETE only  |
//! | `/links`            | [`routes::documents`]   | always                |
//! | `/documents`        | [`routes::documents`]   | always                |
//! | `/documents/:id`    | [`routes::documents`]   | never                 |
//! | `/metrics`          | [`middleware::metrics`] | never                 |
//! | `/openapi.json`     | [`openapi`]             | never                 |
//! | `/health/*`         | here                    | never                 |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → BodyLimit → Handler (Authorized extractor)
//! ```
//!
//! Authentication is per handler: routes that need it take an
//! [`auth::Authorized`] argument, which rejects with 401 before the handler
//! body runs.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::routing::get;
use axum::Router;

use crate::auth::AuthConfig;
use crate::middleware::metrics::ApiMetrics;
use crate::state::AppState;

/// Room for multipart framing on top of the largest accepted file.
const MULTIPART_OVERHEAD_BYTES: u64 = 64 * 1024;

/// Assemble the full application router with all routes and middleware.
///
/// Health probes (`/health/*`) are mounted outside the metrics and body
/// limit layers.
pub fn app(state: AppState) -> Router {
    let auth_config = AuthConfig::new(state.config.credentials.clone());
    let metrics = ApiMetrics::new();
    let body_limit = body_limit_for(state.config.max_upload_bytes);

    let api = Router::new()
        .merge(routes::files::router())
        .merge(routes::documents::router())
        .merge(openapi::router())
        .route("/metrics", get(middleware::metrics::metrics_snapshot))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(middleware::tracing_layer::layer())
        .layer(axum::Extension(auth_config))
        .layer(axum::Extension(metrics))
        .with_state(state.clone());

    let health = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness))
        .with_state(state);

    Router::new().merge(health).merge(api)
}

/// Request body ceiling: the upload limit plus multipart overhead.
fn body_limit_for(max_upload_bytes: u64) -> usize {
    let limit = max_upload_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES);
    usize::try_from(limit).unwrap_or(usize::MAX)
}

/// Liveness probe — always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe — 200 once the metadata database answers, or
/// immediately when metadata is kept in memory.
async fn readiness(State(state): State<AppState>) -> (StatusCode, &'static str) {
    let Some(pool) = &state.db_pool else {
        return (StatusCode::OK, "ready");
    };
    match sqlx::query("SELECT 1").execute(pool).await {
        Ok(_) => (StatusCode::OK, "ready"),
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "database unavailable")
        }
    }
}
