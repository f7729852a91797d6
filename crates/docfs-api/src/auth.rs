//! # Basic Authentication Gate
//!
//! A single static username/password pair guards every mutating route and
//! the privileged flat listings. Plain reads are public.
//!
//! Handlers opt in by taking an [`Authorized`] argument. The extractor reads
//! the [`AuthConfig`] injected as a request extension, parses the
//! `Authorization: Basic` header, and compares both halves in constant time.
//! A failure short-circuits the request with 401 and a
//! `WWW-Authenticate: Basic realm="docfs"` challenge before the handler runs.
//!
//! When no credentials are configured the gate is open.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::headers::authorization::Basic;
use axum_extra::headers::Authorization;
use axum_extra::TypedHeader;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::error::AppError;

/// Realm advertised in the `WWW-Authenticate` challenge.
pub const REALM: &str = "docfs";

/// The configured username/password pair.
///
/// Custom `Debug` redacts the password.
#[derive(Clone)]
pub struct BasicCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl BasicCredentials {
    /// Wrap a username/password pair.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: Zeroizing::new(password.into()),
        }
    }

    /// The expected username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Whether `username`/`password` match, in constant time.
    ///
    /// Both halves are always compared so timing does not reveal which
    /// one was wrong.
    pub fn matches(&self, username: &str, password: &str) -> bool {
        let user_ok = constant_time_eq(username, &self.username);
        let pass_ok = constant_time_eq(password, &self.password);
        user_ok & pass_ok
    }
}

impl std::fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Auth configuration injected into request extensions.
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    /// `None` disables the gate.
    pub credentials: Option<BasicCredentials>,
}

impl AuthConfig {
    /// Gate requiring `credentials`, or an open gate for `None`.
    pub fn new(credentials: Option<BasicCredentials>) -> Self {
        Self { credentials }
    }

    /// Whether the supplied pair passes the gate.
    pub fn is_authorized(&self, username: &str, password: &str) -> bool {
        match &self.credentials {
            Some(expected) => expected.matches(username, password),
            None => true,
        }
    }
}

/// Constant-time string comparison.
///
/// When lengths differ, performs a dummy comparison to avoid leaking length
/// information through timing variance.
fn constant_time_eq(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();
    if provided.len() != expected.len() {
        let _ = expected.ct_eq(expected);
        return false;
    }
    provided.ct_eq(expected).into()
}

/// Proof that the request passed the basic-auth gate.
#[derive(Debug, Clone, Copy)]
pub struct Authorized;

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Authorized {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = parts
            .extensions
            .get::<AuthConfig>()
            .cloned()
            .ok_or_else(|| AppError::Internal("auth configuration missing from request".into()))?;

        let Some(expected) = config.credentials else {
            return Ok(Authorized);
        };

        let TypedHeader(Authorization(basic)) =
            TypedHeader::<Authorization<Basic>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AppError::Unauthorized("basic credentials required".into()))?;

        if expected.matches(basic.username(), basic.password()) {
            Ok(Authorized)
        } else {
            tracing::warn!(
                method = %parts.method,
                uri = %parts.uri,
                "rejected request with invalid credentials"
            );
            Err(AppError::Unauthorized("invalid credentials".into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::routing::get;
    use axum::{Extension, Router};
    use tower::ServiceExt;

    fn gated_app(config: AuthConfig) -> Router {
        Router::new()
            .route("/secret", get(|_: Authorized| async { "in" }))
            .layer(Extension(config))
    }

    fn basic(user: &str, pass: &str) -> String {
        // base64 of "user:pass" for the fixed pairs used below.
        match (user, pass) {
            ("admin", "s3cret") => "Basic YWRtaW46czNjcmV0".to_string(),
            ("admin", "wrong") => "Basic YWRtaW46d3Jvbmc=".to_string(),
            _ => unreachable!("no encoding for {user}:{pass}"),
        }
    }

    fn enabled() -> AuthConfig {
        AuthConfig::new(Some(BasicCredentials::new("admin", "s3cret")))
    }

    #[test]
    fn matching_pair_is_authorized() {
        assert!(enabled().is_authorized("admin", "s3cret"));
        assert!(!enabled().is_authorized("admin", "s3cre"));
        assert!(!enabled().is_authorized("Admin", "s3cret"));
    }

    #[test]
    fn open_gate_authorizes_anything() {
        assert!(AuthConfig::default().is_authorized("", ""));
    }

    #[test]
    fn constant_time_eq_basics() {
        assert!(constant_time_eq("abc", "abc"));
        assert!(!constant_time_eq("abc", "abd"));
        assert!(!constant_time_eq("abc", "abcd"));
        assert!(constant_time_eq("", ""));
    }

    #[test]
    fn debug_redacts_password() {
        let debug = format!("{:?}", BasicCredentials::new("admin", "s3cret"));
        assert!(debug.contains("admin"));
        assert!(!debug.contains("s3cret"));
    }

    #[tokio::test]
    async fn missing_header_is_challenged() {
        let resp = gated_app(enabled())
            .oneshot(Request::builder().uri("/secret").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            resp.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Basic realm=\"docfs\""
        );
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let resp = gated_app(enabled())
            .oneshot(
                Request::builder()
                    .uri("/secret")
                    .header(header::AUTHORIZATION, basic("admin", "wrong"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn correct_pair_passes() {
        let resp = gated_app(enabled())
            .oneshot(
                Request::builder()
                    .uri("/secret")
                    .header(header::AUTHORIZATION, basic("admin", "s3cret"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn open_gate_needs_no_header() {
        let resp = gated_app(AuthConfig::default())
            .oneshot(Request::builder().uri("/secret").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
