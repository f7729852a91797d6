//! # Integration Tests for docfs-api
//!
//! Drives the fully assembled router: health probes, the upload/dedup
//! walkthrough over HTTP, basic-auth gating, body limits, downloads,
//! metrics and the OpenAPI document.

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use docfs_api::auth::BasicCredentials;
use docfs_api::config::AppConfig;
use docfs_api::state::AppState;

const BOUNDARY: &str = "----docfs-integration";
/// base64("admin:s3cret")
const GOOD_AUTH: &str = "Basic YWRtaW46czNjcmV0";
/// base64("admin:wrong")
const BAD_AUTH: &str = "Basic YWRtaW46d3Jvbmc=";

/// Helper: build the test app with auth disabled.
fn test_app() -> axum::Router {
    docfs_api::app(AppState::new())
}

/// Helper: build the test app with auth enabled (admin / s3cret).
fn test_app_with_auth() -> axum::Router {
    let config = AppConfig {
        credentials: Some(BasicCredentials::new("admin", "s3cret")),
        ..AppConfig::default()
    };
    docfs_api::app(AppState::with_config(config))
}

/// Helper: read response body as string.
async fn body_string(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn delete(uri: &str, auth: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("DELETE").uri(uri);
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    builder.body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value, auth: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    builder
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn upload(uri: &str, filename: &str, content: &[u8], auth: Option<&str>) -> Request<Body> {
    let mut body = Vec::new();
    // A non-file field first; the handler must skip it.
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nignored\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    builder.body(Body::from(body)).unwrap()
}

async fn send(app: &axum::Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

// -- Health Probes ------------------------------------------------------------

#[tokio::test]
async fn test_liveness_probe() {
    let response = send(&test_app(), get("/health/liveness")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ok");
}

#[tokio::test]
async fn test_readiness_probe_in_memory() {
    let response = send(&test_app(), get("/health/readiness")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ready");
}

#[tokio::test]
async fn test_health_needs_no_credentials() {
    let app = test_app_with_auth();
    let response = send(&app, get("/health/liveness")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

// -- Walkthrough ----------------------------------------------------------------

#[tokio::test]
async fn test_upload_dedup_walkthrough() {
    let app = test_app();

    let response = send(&app, post_json("/files", json!({"name": "wb"}), None)).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    for project in ["p1", "p2"] {
        let response = send(
            &app,
            post_json("/files/wb", json!({"project_id": project}), None),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(body_json(response).await["id"], project);
    }

    let content = vec![7u8; 2048];
    let first = body_json(send(&app, upload("/files/wb/p1", "a.txt", &content, None)).await).await;
    let second = body_json(send(&app, upload("/files/wb/p2", "b.txt", &content, None)).await).await;

    let doc = &first["location"];
    assert_eq!(doc["filetype"], "txt");
    assert_eq!(doc["size_in_kb"], 2);
    assert_eq!(doc["name"], "a.txt");
    // Same content: the first upload's document is reused.
    assert_eq!(second["location"]["key"], doc["key"]);
    assert_eq!(second["location"]["md5"], doc["md5"]);

    let listing = body_json(send(&app, get("/files/wb")).await).await;
    assert_eq!(listing["location"], "wb");
    let projects = listing["contents"].as_array().unwrap();
    assert_eq!(projects.len(), 2);
    for project in projects {
        assert_eq!(project["type"], "project");
        assert_eq!(project["document_count"], 1);
    }

    let root = body_json(send(&app, get("/files")).await).await;
    assert_eq!(root["location"], "root");
    assert_eq!(root["contents"][0]["name"], "wb");
    assert_eq!(root["contents"][0]["project_count"], 2);

    let documents = body_json(send(&app, get("/documents")).await).await;
    assert_eq!(documents.as_array().unwrap().len(), 1);

    let links = body_json(send(&app, get("/links")).await).await;
    let links = links.as_array().unwrap();
    assert_eq!(links.len(), 2);
    assert!(links.iter().all(|l| l["document_id"] == doc["key"]));
}

#[tokio::test]
async fn test_upload_to_missing_project_is_not_found() {
    let app = test_app();
    send(&app, post_json("/files", json!({"name": "wb"}), None)).await;

    let response = send(&app, upload("/files/wb/ghost", "a.txt", b"x", None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let documents = body_json(send(&app, get("/documents")).await).await;
    assert!(documents.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_download_round_trip() {
    let app = test_app();
    send(&app, post_json("/files", json!({"name": "wb"}), None)).await;
    send(&app, post_json("/files/wb", json!({"project_id": "p1"}), None)).await;

    let content = b"%PDF-1.7 round trip".to_vec();
    let uploaded =
        body_json(send(&app, upload("/files/wb/p1", "report.pdf", &content, None)).await).await;
    let path = uploaded["location"]["path"].as_str().unwrap().to_string();
    let key = uploaded["location"]["key"].as_str().unwrap().to_string();

    for uri in [path, format!("/files/wb/p1/{key}")] {
        let response = send(&app, get(&uri)).await;
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION]
                .to_str()
                .unwrap(),
            "attachment; filename=\"report.pdf\"; filename*=UTF-8''report.pdf"
        );
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(bytes.to_vec(), content);
    }
}

#[tokio::test]
async fn test_delete_project_keeps_documents() {
    let app = test_app();
    send(&app, post_json("/files", json!({"name": "wb"}), None)).await;
    send(&app, post_json("/files/wb", json!({"project_id": "p1"}), None)).await;
    send(&app, upload("/files/wb/p1", "a.txt", b"survivor", None)).await;

    let response = send(&app, delete("/files/wb/p1", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"status": "success"}));

    let response = send(&app, get("/files/wb/p1")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let documents = body_json(send(&app, get("/documents")).await).await;
    assert_eq!(documents.as_array().unwrap().len(), 1);
    let links = body_json(send(&app, get("/links")).await).await;
    assert!(links.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_missing_namespace_is_not_found() {
    let response = send(&test_app(), delete("/files/ghost", None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// -- Limits -----------------------------------------------------------------------

#[tokio::test]
async fn test_oversized_upload_rejected_by_body_limit() {
    let config = AppConfig {
        max_upload_bytes: 1024,
        ..AppConfig::default()
    };
    let app = docfs_api::app(AppState::with_config(config));
    send(&app, post_json("/files", json!({"name": "wb"}), None)).await;
    send(&app, post_json("/files/wb", json!({"project_id": "p1"}), None)).await;

    let response = send(&app, upload("/files/wb/p1", "big.bin", &vec![1u8; 200 * 1024], None)).await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body_json(response).await["error"]["code"], "file_too_large");

    // Just over the limit but inside the framing allowance: the catalog
    // enforces the exact ceiling.
    let response = send(&app, upload("/files/wb/p1", "big.bin", &[1u8; 1025], None)).await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let response = send(&app, upload("/files/wb/p1", "ok.bin", &[1u8; 1024], None)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

// -- Authentication -----------------------------------------------------------------

#[tokio::test]
async fn test_mutations_require_auth() {
    let app = test_app_with_auth();

    let response = send(&app, post_json("/files", json!({"name": "wb"}), None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers()[header::WWW_AUTHENTICATE],
        "Basic realm=\"docfs\""
    );
    assert_eq!(body_json(response).await["error"]["code"], "unauthorized");

    let response = send(&app, post_json("/files", json!({"name": "wb"}), Some(BAD_AUTH))).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(&app, post_json("/files", json!({"name": "wb"}), Some(GOOD_AUTH))).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // Nothing was created by the rejected attempts.
    let root = body_json(send(&app, get("/files")).await).await;
    assert_eq!(root["contents"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_privileged_listings_require_auth() {
    let app = test_app_with_auth();
    for uri in ["/links", "/documents"] {
        let response = send(&app, get(uri)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");

        let response = send(
            &app,
            Request::builder()
                .uri(uri)
                .header(header::AUTHORIZATION, GOOD_AUTH)
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
    }
}

#[tokio::test]
async fn test_upload_and_delete_require_auth() {
    let app = test_app_with_auth();
    send(&app, post_json("/files", json!({"name": "wb"}), Some(GOOD_AUTH))).await;
    send(
        &app,
        post_json("/files/wb", json!({"project_id": "p1"}), Some(GOOD_AUTH)),
    )
    .await;

    let response = send(&app, upload("/files/wb/p1", "a.txt", b"x", None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(&app, upload("/files/wb/p1", "a.txt", b"x", Some(GOOD_AUTH))).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = send(&app, delete("/files/wb", None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(&app, delete("/files/wb", Some(GOOD_AUTH))).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_public_reads_with_auth_enabled() {
    let app = test_app_with_auth();
    send(&app, post_json("/files", json!({"name": "wb"}), Some(GOOD_AUTH))).await;

    let response = send(&app, get("/files")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = send(&app, get("/files/wb")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

// -- Operations ----------------------------------------------------------------------

#[tokio::test]
async fn test_metrics_count_requests() {
    let app = test_app();
    send(&app, get("/files")).await;
    send(&app, get("/files/ghost")).await;

    let response = send(&app, get("/metrics")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let metrics = body_json(response).await;
    // The /metrics request itself is counted after its response is built.
    assert_eq!(metrics["requests"], 2);
    assert_eq!(metrics["errors"], 1);
    assert_eq!(metrics["server_errors"], 0);
}

#[tokio::test]
async fn test_openapi_spec_served() {
    let response = send(&test_app(), get("/openapi.json")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let spec = body_json(response).await;
    assert!(spec["paths"]["/files/{namespace}/{project}"].is_object());
    assert!(spec["components"]["securitySchemes"]["basic_auth"].is_object());
}

#[tokio::test]
async fn test_replace_document_not_implemented() {
    let app = test_app();
    let response = send(&app, upload("/files/wb/p1/doc", "a.txt", b"x", None)).await;
    assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
}
