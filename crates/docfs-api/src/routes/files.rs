//! # File Hierarchy API
//!
//! HTTP surface for the namespace → project → document hierarchy:
//!
//! - **GET `/files`**: root listing of namespaces
//! - **POST `/files`**: create a namespace
//! - **GET `/files/:namespace`**: list a namespace's projects
//! - **POST `/files/:namespace`**: create a project in a namespace
//! - **DELETE `/files/:namespace`**: delete a namespace, its projects and their links
//! - **GET `/files/:namespace/:project`**: list a project's documents
//! - **POST `/files/:namespace/:project`**: upload a file into a project
//! - **DELETE `/files/:namespace/:project`**: delete a project and its links
//! - **GET `/files/:namespace/:project/:document`**: download a linked document
//! - **POST `/files/:namespace/:project/:document`**: replace a document (not implemented)
//! - **DELETE `/files/:namespace/:project/:document`**: detach a document from a project
//!
//! Reads never create anything: a missing namespace or project is 404.
//! Namespace and project path segments are trimmed before lookup, the same
//! normalization applied on create, so `/files/%20wb` addresses `wb`.
//! Every POST and DELETE takes [`Authorized`] and so passes the basic-auth
//! gate before any catalog work happens.

use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::routing::get;
use axum::{Json, Router};
use docfs_core::{Located, NamespaceView, ProjectView};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::documents::attachment_response;
use super::StatusBody;
use crate::auth::Authorized;
use crate::error::AppError;
use crate::extractors::{extract_validated_json, read_upload, Validate};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request to create a namespace.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateNamespaceRequest {
    /// Namespace name (1-50 characters, no `/`).
    pub name: String,
}

impl Validate for CreateNamespaceRequest {
    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name must not be empty".to_string());
        }
        Ok(())
    }
}

/// Request to create a project.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateProjectRequest {
    /// Project id, unique within the namespace (1-50 characters, no `/`).
    pub project_id: String,
}

impl Validate for CreateProjectRequest {
    fn validate(&self) -> Result<(), String> {
        if self.project_id.trim().is_empty() {
            return Err("project_id must not be empty".to_string());
        }
        Ok(())
    }
}

/// Multipart upload form. The part's filename becomes the display name.
#[derive(Debug, ToSchema)]
pub struct UploadForm {
    /// File content.
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the files router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/files", get(root_listing).post(create_namespace))
        .route(
            "/files/:namespace",
            get(namespace_listing)
                .post(create_project)
                .delete(delete_namespace),
        )
        .route(
            "/files/:namespace/:project",
            get(project_listing)
                .post(upload_document)
                .delete(delete_project),
        )
        .route(
            "/files/:namespace/:project/:document",
            get(download_document)
                .post(replace_document)
                .delete(detach_document),
        )
}

// ---------------------------------------------------------------------------
// Namespaces
// ---------------------------------------------------------------------------

/// GET /files — All namespaces.
#[utoipa::path(
    get,
    path = "/files",
    responses(
        (status = 200, description = "Root listing of namespaces", body = Located),
    ),
    tag = "files"
)]
async fn root_listing(State(state): State<AppState>) -> Result<Json<Located>, AppError> {
    Ok(Json(state.catalog.root_listing().await?))
}

/// POST /files — Create a namespace.
#[utoipa::path(
    post,
    path = "/files",
    request_body = CreateNamespaceRequest,
    responses(
        (status = 201, description = "Namespace created", body = NamespaceView),
        (status = 401, description = "Missing or invalid credentials", body = crate::error::ErrorBody),
        (status = 409, description = "Namespace already exists", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid name", body = crate::error::ErrorBody),
    ),
    security(("basic_auth" = [])),
    tag = "files"
)]
async fn create_namespace(
    _auth: Authorized,
    State(state): State<AppState>,
    body: Result<Json<CreateNamespaceRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<NamespaceView>), AppError> {
    let req = extract_validated_json(body)?;
    let namespace = state.catalog.create_namespace(&req.name).await?;
    Ok((StatusCode::CREATED, Json(namespace.view(0))))
}

/// GET /files/:namespace — Projects of a namespace.
#[utoipa::path(
    get,
    path = "/files/{namespace}",
    params(("namespace" = String, Path, description = "Namespace name")),
    responses(
        (status = 200, description = "Namespace listing of projects", body = Located),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "files"
)]
async fn namespace_listing(
    State(state): State<AppState>,
    Path(namespace): Path<String>,
) -> Result<Json<Located>, AppError> {
    Ok(Json(state.catalog.namespace_listing(&namespace).await?))
}

/// DELETE /files/:namespace — Delete a namespace with its projects and links.
#[utoipa::path(
    delete,
    path = "/files/{namespace}",
    params(("namespace" = String, Path, description = "Namespace name")),
    responses(
        (status = 200, description = "Namespace deleted", body = StatusBody),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
        (status = 409, description = "Not deleted", body = crate::error::ErrorBody),
    ),
    security(("basic_auth" = [])),
    tag = "files"
)]
async fn delete_namespace(
    _auth: Authorized,
    State(state): State<AppState>,
    Path(namespace): Path<String>,
) -> Result<Json<StatusBody>, AppError> {
    state.catalog.delete_namespace(&namespace).await?;
    Ok(Json(StatusBody::success()))
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

/// POST /files/:namespace — Create a project in an existing namespace.
#[utoipa::path(
    post,
    path = "/files/{namespace}",
    params(("namespace" = String, Path, description = "Namespace name")),
    request_body = CreateProjectRequest,
    responses(
        (status = 201, description = "Project created", body = ProjectView),
        (status = 404, description = "Namespace not found", body = crate::error::ErrorBody),
        (status = 409, description = "Project already exists", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid project id", body = crate::error::ErrorBody),
    ),
    security(("basic_auth" = [])),
    tag = "files"
)]
async fn create_project(
    _auth: Authorized,
    State(state): State<AppState>,
    Path(namespace): Path<String>,
    body: Result<Json<CreateProjectRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ProjectView>), AppError> {
    let req = extract_validated_json(body)?;
    let project = state
        .catalog
        .create_project(&namespace, &req.project_id)
        .await?;
    Ok((StatusCode::CREATED, Json(project.view(0))))
}

/// GET /files/:namespace/:project — Documents linked under a project.
#[utoipa::path(
    get,
    path = "/files/{namespace}/{project}",
    params(
        ("namespace" = String, Path, description = "Namespace name"),
        ("project" = String, Path, description = "Project id"),
    ),
    responses(
        (status = 200, description = "Project listing of documents", body = Located),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "files"
)]
async fn project_listing(
    State(state): State<AppState>,
    Path((namespace, project)): Path<(String, String)>,
) -> Result<Json<Located>, AppError> {
    Ok(Json(
        state.catalog.project_listing(&namespace, &project).await?,
    ))
}

/// DELETE /files/:namespace/:project — Delete a project and its links.
///
/// Linked documents stay catalogued.
#[utoipa::path(
    delete,
    path = "/files/{namespace}/{project}",
    params(
        ("namespace" = String, Path, description = "Namespace name"),
        ("project" = String, Path, description = "Project id"),
    ),
    responses(
        (status = 200, description = "Project deleted", body = StatusBody),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
        (status = 409, description = "Not deleted", body = crate::error::ErrorBody),
    ),
    security(("basic_auth" = [])),
    tag = "files"
)]
async fn delete_project(
    _auth: Authorized,
    State(state): State<AppState>,
    Path((namespace, project)): Path<(String, String)>,
) -> Result<Json<StatusBody>, AppError> {
    state.catalog.delete_project(&namespace, &project).await?;
    Ok(Json(StatusBody::success()))
}

// ---------------------------------------------------------------------------
// Documents within a project
// ---------------------------------------------------------------------------

/// POST /files/:namespace/:project — Upload a file and link it to the project.
///
/// Content already in the catalog is reused rather than stored again.
#[utoipa::path(
    post,
    path = "/files/{namespace}/{project}",
    params(
        ("namespace" = String, Path, description = "Namespace name"),
        ("project" = String, Path, description = "Project id"),
    ),
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Document linked; location is the document view", body = Located),
        (status = 400, description = "No file received", body = crate::error::ErrorBody),
        (status = 404, description = "Namespace or project not found", body = crate::error::ErrorBody),
        (status = 413, description = "File too large", body = crate::error::ErrorBody),
        (status = 422, description = "Not saved", body = crate::error::ErrorBody),
        (status = 502, description = "Storage unavailable", body = crate::error::ErrorBody),
    ),
    security(("basic_auth" = [])),
    tag = "files"
)]
async fn upload_document(
    _auth: Authorized,
    State(state): State<AppState>,
    Path((namespace, project)): Path<(String, String)>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<Located>), AppError> {
    let file = read_upload(multipart).await?;
    let attachment = state
        .catalog
        .attach_document(&namespace, &project, file)
        .await?;
    Ok((StatusCode::CREATED, Json(Located::at(attachment.view()))))
}

/// GET /files/:namespace/:project/:document — Download a document linked
/// under this project.
#[utoipa::path(
    get,
    path = "/files/{namespace}/{project}/{document}",
    params(
        ("namespace" = String, Path, description = "Namespace name"),
        ("project" = String, Path, description = "Project id"),
        ("document" = String, Path, description = "Document ID"),
    ),
    responses(
        (status = 200, description = "Document content", content_type = "application/octet-stream", body = Vec<u8>),
        (status = 404, description = "Not found or not linked here", body = crate::error::ErrorBody),
        (status = 502, description = "Storage unavailable", body = crate::error::ErrorBody),
    ),
    tag = "files"
)]
async fn download_document(
    State(state): State<AppState>,
    Path((namespace, project, document)): Path<(String, String, String)>,
) -> Result<Response, AppError> {
    let content = state
        .catalog
        .fetch_project_document(&namespace, &project, &document)
        .await?;
    attachment_response(content)
}

/// POST /files/:namespace/:project/:document — Replace a document.
///
/// Documents are immutable; upload new content instead.
#[utoipa::path(
    post,
    path = "/files/{namespace}/{project}/{document}",
    params(
        ("namespace" = String, Path, description = "Namespace name"),
        ("project" = String, Path, description = "Project id"),
        ("document" = String, Path, description = "Document ID"),
    ),
    responses(
        (status = 501, description = "Not implemented", body = crate::error::ErrorBody),
    ),
    security(("basic_auth" = [])),
    tag = "files"
)]
async fn replace_document(
    _auth: Authorized,
    Path((_namespace, _project, _document)): Path<(String, String, String)>,
) -> Result<Json<StatusBody>, AppError> {
    Err(AppError::NotImplemented(
        "documents cannot be replaced".to_string(),
    ))
}

/// DELETE /files/:namespace/:project/:document — Unlink a document from
/// the project. The document itself is kept.
#[utoipa::path(
    delete,
    path = "/files/{namespace}/{project}/{document}",
    params(
        ("namespace" = String, Path, description = "Namespace name"),
        ("project" = String, Path, description = "Project id"),
        ("document" = String, Path, description = "Document ID"),
    ),
    responses(
        (status = 200, description = "Link deleted", body = StatusBody),
        (status = 404, description = "Not found or not linked here", body = crate::error::ErrorBody),
        (status = 409, description = "Not deleted", body = crate::error::ErrorBody),
    ),
    security(("basic_auth" = [])),
    tag = "files"
)]
async fn detach_document(
    _auth: Authorized,
    State(state): State<AppState>,
    Path((namespace, project, document)): Path<(String, String, String)>,
) -> Result<Json<StatusBody>, AppError> {
    state
        .catalog
        .detach_document(&namespace, &project, &document)
        .await?;
    Ok(Json(StatusBody::success()))
}
