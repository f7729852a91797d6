//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps catalog errors to HTTP status codes and returns a JSON body
//! carrying a short error kind. Internal and storage failures are logged
//! and replaced by a generic message.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use docfs_catalog::CatalogError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::auth::REALM;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Error kind (e.g. "not_found", "file_too_large").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Entity lookup miss (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Validation or constraint failure on create (422).
    #[error("not saved: {0}")]
    NotSaved(String),

    /// Create collided with an existing entity (409).
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// Delete did not complete (409).
    #[error("not deleted: {0}")]
    NotDeleted(String),

    /// Upload request carried no file (400).
    #[error("no file received")]
    NoFileReceived,

    /// Upload exceeded the size ceiling (413).
    #[error("file too large: {0}")]
    FileTooLarge(String),

    /// Deliberately unsupported operation (501).
    #[error("not implemented: {0}")]
    NotImplemented(String),

    /// Missing or invalid credentials (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Request body could not be parsed (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Blob storage failed (502). Message is logged, not returned.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Internal server error (500). Message is logged, not returned.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Return the HTTP status code and error kind for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            Self::NotSaved(_) => (StatusCode::UNPROCESSABLE_ENTITY, "not_saved"),
            Self::AlreadyExists(_) => (StatusCode::CONFLICT, "not_saved"),
            Self::NotDeleted(_) => (StatusCode::CONFLICT, "not_deleted"),
            Self::NoFileReceived => (StatusCode::BAD_REQUEST, "no_file_received"),
            Self::FileTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, "file_too_large"),
            Self::NotImplemented(_) => (StatusCode::NOT_IMPLEMENTED, "not_implemented"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            Self::StorageUnavailable(_) => (StatusCode::BAD_GATEWAY, "storage_unavailable"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            Self::StorageUnavailable(_) => "Document storage is unavailable".to_string(),
            other => other.to_string(),
        };

        match &self {
            Self::Internal(_) => tracing::error!(error = %self, "internal server error"),
            Self::StorageUnavailable(_) => tracing::error!(error = %self, "storage failure"),
            _ => {}
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        let mut response = (status, Json(body)).into_response();
        if matches!(self, Self::Unauthorized(_)) {
            let challenge = format!("Basic realm=\"{REALM}\"");
            if let Ok(value) = HeaderValue::from_str(&challenge) {
                response.headers_mut().insert(header::WWW_AUTHENTICATE, value);
            }
        }
        response
    }
}

/// Convert catalog outcomes to API errors.
impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound { .. } => Self::NotFound(err.to_string()),
            CatalogError::AlreadyExists { .. } => Self::AlreadyExists(err.to_string()),
            CatalogError::NotSaved(msg) => Self::NotSaved(msg),
            CatalogError::NotDeleted(msg) => Self::NotDeleted(msg),
            CatalogError::NoFileReceived => Self::NoFileReceived,
            CatalogError::FileTooLarge { size, max } => {
                Self::FileTooLarge(format!("{size} bytes exceeds the {max} byte limit"))
            }
            CatalogError::Storage(e) => Self::StorageUnavailable(e.to_string()),
            CatalogError::Metadata(e) => Self::Internal(e.to_string()),
        }
    }
}
