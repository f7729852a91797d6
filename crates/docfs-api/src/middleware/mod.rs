//! # Middleware
//!
//! - `metrics`: request/error counters behind `GET /metrics`.
//! - `tracing_layer`: per-request tracing spans.

pub mod metrics;
pub mod tracing_layer;
