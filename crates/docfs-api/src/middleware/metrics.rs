//! # Request Metrics
//!
//! Lightweight request metrics using atomic counters, readable as JSON at
//! `GET /metrics`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Shared metrics state.
#[derive(Debug, Clone)]
pub struct ApiMetrics {
    pub request_count: Arc<AtomicU64>,
    pub error_count: Arc<AtomicU64>,
    pub server_error_count: Arc<AtomicU64>,
}

impl ApiMetrics {
    /// Create a new metrics instance.
    pub fn new() -> Self {
        Self {
            request_count: Arc::new(AtomicU64::new(0)),
            error_count: Arc::new(AtomicU64::new(0)),
            server_error_count: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Return current request count.
    pub fn requests(&self) -> u64 {
        self.request_count.load(Ordering::Relaxed)
    }

    /// Return current error count (4xx and 5xx).
    pub fn errors(&self) -> u64 {
        self.error_count.load(Ordering::Relaxed)
    }

    /// Return current 5xx count.
    pub fn server_errors(&self) -> u64 {
        self.server_error_count.load(Ordering::Relaxed)
    }

    /// Point-in-time copy of the counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests: self.requests(),
            errors: self.errors(),
            server_errors: self.server_errors(),
        }
    }
}

impl Default for ApiMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Counter values served by `GET /metrics`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MetricsSnapshot {
    /// Requests completed.
    pub requests: u64,
    /// Requests answered with a 4xx or 5xx status.
    pub errors: u64,
    /// Requests answered with a 5xx status.
    pub server_errors: u64,
}

/// Middleware that increments request and error counters.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let metrics = request.extensions().get::<ApiMetrics>().cloned();

    let response = next.run(request).await;

    if let Some(m) = metrics {
        m.request_count.fetch_add(1, Ordering::Relaxed);
        let status = response.status();
        if status.is_server_error() || status.is_client_error() {
            m.error_count.fetch_add(1, Ordering::Relaxed);
        }
        if status.is_server_error() {
            m.server_error_count.fetch_add(1, Ordering::Relaxed);
        }
    }

    response
}

/// GET /metrics — current request counters.
#[utoipa::path(
    get,
    path = "/metrics",
    responses(
        (status = 200, description = "Request counters", body = MetricsSnapshot),
    ),
    tag = "operations"
)]
pub async fn metrics_snapshot(Extension(metrics): Extension<ApiMetrics>) -> Json<MetricsSnapshot> {
    Json(metrics.snapshot())
}
