//! # Custom Extractors & Validation
//!
//! Provides the [`Validate`] trait for request DTOs, a helper to extract
//! and validate JSON bodies in handlers, and the multipart upload reader.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::JsonRejection;
use axum::extract::Multipart;
use axum::http::StatusCode;
use axum::Json;
use docfs_catalog::UploadedFile;

use crate::error::AppError;

/// Name of the multipart field carrying the uploaded file.
pub const UPLOAD_FIELD: &str = "file";

/// Trait for request types that can validate their business rules
/// beyond what serde deserialization checks.
pub trait Validate {
    /// Validate business rules. Returns an error message on failure.
    fn validate(&self) -> Result<(), String>;
}

/// Extract a JSON body, mapping deserialization errors to [`AppError::BadRequest`].
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result
        .map(|Json(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

/// Extract a JSON body and validate it using the [`Validate`] trait.
///
/// Validation failures are [`AppError::NotSaved`], the outcome of a create
/// whose input was rejected.
pub fn extract_validated_json<T: Validate>(
    result: Result<Json<T>, JsonRejection>,
) -> Result<T, AppError> {
    let value = extract_json(result)?;
    value.validate().map_err(AppError::NotSaved)?;
    Ok(value)
}

/// Read the `file` field of a multipart upload.
///
/// A request that is not multipart, or has no `file` field, yields `None`.
/// Other fields are skipped. A body over the configured limit becomes
/// [`AppError::FileTooLarge`].
pub async fn read_upload(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Option<UploadedFile>, AppError> {
    let Ok(mut multipart) = multipart else {
        return Ok(None);
    };

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(multipart_error)?;
        return Ok(Some(UploadedFile {
            name,
            bytes: bytes.to_vec(),
        }));
    }
    Ok(None)
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::FileTooLarge(err.body_text())
    } else {
        AppError::BadRequest(err.body_text())
    }
}
