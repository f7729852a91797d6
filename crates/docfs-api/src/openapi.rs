//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI spec,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::state::AppState;

/// Adds the HTTP basic security scheme to the OpenAPI spec.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "basic_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Basic)),
            );
        }
    }
}

/// Assembled OpenAPI spec for the docfs API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "docfs API",
        version = "0.1.0",
        description = "Content-addressed document catalog.\n\nDocuments are filed under projects inside namespaces. Uploads are deduplicated by MD5: identical content is stored once and linked from every project it was uploaded to.\n\nAuthentication: HTTP basic. Creates, uploads, deletes and the flat `/links` and `/documents` listings require credentials. Reads of the `/files` hierarchy and raw document downloads are public.",
        license(name = "AGPL-3.0-or-later")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server"),
    ),
    paths(
        // ── File hierarchy ──────────────────────────────────────────────
        crate::routes::files::root_listing,
        crate::routes::files::create_namespace,
        crate::routes::files::namespace_listing,
        crate::routes::files::delete_namespace,
        crate::routes::files::create_project,
        crate::routes::files::project_listing,
        crate::routes::files::delete_project,
        crate::routes::files::upload_document,
        crate::routes::files::download_document,
        crate::routes::files::replace_document,
        crate::routes::files::detach_document,
        // ── Flat listings and raw bytes ─────────────────────────────────
        crate::routes::documents::list_links,
        crate::routes::documents::list_documents,
        crate::routes::documents::download_raw_document,
        // ── Operations ──────────────────────────────────────────────────
        crate::middleware::metrics::metrics_snapshot,
    ),
    components(
        schemas(
            // ── Views ───────────────────────────────────────────────────
            docfs_core::Located,
            docfs_core::NamespaceView,
            docfs_core::ProjectView,
            docfs_core::DocumentView,
            docfs_core::LinkView,
            // ── Request DTOs ────────────────────────────────────────────
            crate::routes::files::CreateNamespaceRequest,
            crate::routes::files::CreateProjectRequest,
            crate::routes::files::UploadForm,
            // ── Responses ───────────────────────────────────────────────
            crate::routes::StatusBody,
            crate::middleware::metrics::MetricsSnapshot,
            crate::error::ErrorBody,
            crate::error::ErrorDetail,
        ),
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "files", description = "Namespace, project and document hierarchy"),
        (name = "documents", description = "Flat link and document listings, raw downloads"),
        (name = "operations", description = "Request metrics"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
///
/// Serves the OpenAPI JSON spec at `/openapi.json`.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json — Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_generates() {
        let spec = ApiDoc::openapi();
        assert_eq!(spec.info.title, "docfs API");
    }

    #[test]
    fn spec_has_file_paths() {
        let spec = ApiDoc::openapi();
        for path in [
            "/files",
            "/files/{namespace}",
            "/files/{namespace}/{project}",
            "/files/{namespace}/{project}/{document}",
        ] {
            assert!(spec.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn spec_has_document_paths() {
        let spec = ApiDoc::openapi();
        assert!(spec.paths.paths.contains_key("/links"));
        assert!(spec.paths.paths.contains_key("/documents"));
        assert!(spec.paths.paths.contains_key("/documents/{id}"));
    }

    #[test]
    fn spec_registers_basic_auth() {
        let spec = ApiDoc::openapi();
        let components = spec.components.expect("components");
        assert!(components.security_schemes.contains_key("basic_auth"));
    }

    #[test]
    fn spec_registers_views() {
        let spec = ApiDoc::openapi();
        let components = spec.components.expect("components");
        for schema in ["Located", "DocumentView", "LinkView", "ErrorBody"] {
            assert!(components.schemas.contains_key(schema), "missing {schema}");
        }
    }
}
