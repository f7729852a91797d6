//! # Document API
//!
//! Flat views over the whole catalog, outside the `/files` hierarchy:
//!
//! - **GET `/links`** lists every link in its expanded form (auth required)
//! - **GET `/documents`** lists every document (auth required)
//! - **GET `/documents/:id`** streams a document's bytes (public)

use axum::extract::{Path, State};
use axum::http::{header, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use docfs_catalog::DocumentBytes;
use docfs_core::{DocumentView, LinkView};

use crate::auth::Authorized;
use crate::error::AppError;
use crate::state::AppState;

/// Build the documents router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/links", get(list_links))
        .route("/documents", get(list_documents))
        .route("/documents/:id", get(download_raw_document))
}

/// GET /links — Every link with its document.
#[utoipa::path(
    get,
    path = "/links",
    responses(
        (status = 200, description = "All links", body = Vec<LinkView>),
        (status = 401, description = "Missing or invalid credentials", body = crate::error::ErrorBody),
    ),
    security(("basic_auth" = [])),
    tag = "documents"
)]
async fn list_links(
    _auth: Authorized,
    State(state): State<AppState>,
) -> Result<Json<Vec<LinkView>>, AppError> {
    Ok(Json(state.catalog.list_links().await?))
}

/// GET /documents — Every catalogued document, linked or orphaned.
#[utoipa::path(
    get,
    path = "/documents",
    responses(
        (status = 200, description = "All documents", body = Vec<DocumentView>),
        (status = 401, description = "Missing or invalid credentials", body = crate::error::ErrorBody),
    ),
    security(("basic_auth" = [])),
    tag = "documents"
)]
async fn list_documents(
    _auth: Authorized,
    State(state): State<AppState>,
) -> Result<Json<Vec<DocumentView>>, AppError> {
    let documents = state.catalog.list_documents().await?;
    Ok(Json(documents.iter().map(|d| d.view()).collect()))
}

/// GET /documents/:id — Raw document bytes as an attachment.
#[utoipa::path(
    get,
    path = "/documents/{id}",
    params(("id" = String, Path, description = "Document ID")),
    responses(
        (status = 200, description = "Document content", content_type = "application/octet-stream", body = Vec<u8>),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
        (status = 502, description = "Storage unavailable", body = crate::error::ErrorBody),
    ),
    tag = "documents"
)]
async fn download_raw_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let content = state.catalog.fetch_document_bytes(&id).await?;
    attachment_response(content)
}

/// Respond with `content` as an octet-stream download named after the
/// document's display name.
pub(crate) fn attachment_response(content: DocumentBytes) -> Result<Response, AppError> {
    let disposition = HeaderValue::from_str(&content_disposition(content.name()))
        .map_err(|e| AppError::Internal(format!("invalid content-disposition: {e}")))?;

    tracing::debug!(
        document = %content.document.id,
        bytes = content.bytes.len(),
        "sending document"
    );

    Ok((
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/octet-stream"),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        content.bytes,
    )
        .into_response())
}

/// `attachment` disposition with an ASCII fallback `filename` and the exact
/// name as RFC 5987 `filename*`.
fn content_disposition(name: &str) -> String {
    let fallback: String = name
        .chars()
        .map(|c| match c {
            ' '..='~' if c != '"' && c != '\\' => c,
            _ => '_',
        })
        .collect();

    let mut encoded = String::with_capacity(name.len());
    for byte in name.bytes() {
        if byte.is_ascii_alphanumeric() || b"!#$&+-.^_`|~".contains(&byte) {
            encoded.push(char::from(byte));
        } else {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }

    format!("attachment; filename=\"{fallback}\"; filename*=UTF-8''{encoded}")
}
