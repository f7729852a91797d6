//! # Server Configuration
//!
//! Built once at startup by [`AppConfig::from_env`] and passed into
//! component constructors. Nothing here is read again after startup.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `PORT` | `8080` |
//! | `DOCFS_MAX_UPLOAD_BYTES` | `26214400` (25 MiB) |
//! | `DOCFS_USERNAME` / `DOCFS_PASSWORD` | unset: auth disabled |
//! | `DATABASE_URL` | unset: in-memory metadata |
//! | `DOCFS_BLOB_BACKEND` | `memory` (`s3`, `fs`) |
//! | `DOCFS_BUCKET` | `docfs` |
//! | `AWS_REGION` | `us-east-1` |
//! | `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY` | unset: default AWS credential chain |
//! | `AWS_ENDPOINT_URL` | unset |
//! | `DOCFS_PUBLIC_BASE_URL` | `https://s3.amazonaws.com/<bucket>` (s3), `file://<root>` (fs) |
//! | `DOCFS_BLOB_ROOT` | `./blobs` |
//! | `LOG_FORMAT` | `text` (`json`) |

use std::path::PathBuf;

use docfs_blob::S3Settings;
use docfs_catalog::DEFAULT_MAX_UPLOAD_BYTES;
use url::Url;
use zeroize::Zeroizing;

use crate::auth::BasicCredentials;

/// Where document bytes are kept.
#[derive(Debug, Clone)]
pub enum BlobBackend {
    /// Process memory. Contents are lost on restart.
    Memory,
    /// A local directory.
    Filesystem {
        /// Directory holding the objects.
        root: PathBuf,
        /// Base of the URLs recorded for stored objects.
        public_base_url: String,
    },
    /// An S3 bucket.
    S3(S3Settings),
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Application configuration.
///
/// Custom `Debug` redacts the database URL and every credential.
#[derive(Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Largest accepted upload, in bytes.
    pub max_upload_bytes: u64,
    /// Basic-auth pair for mutating and privileged routes.
    /// If `None`, authentication is disabled.
    pub credentials: Option<BasicCredentials>,
    /// Postgres connection string. `None` keeps metadata in memory.
    pub database_url: Option<Zeroizing<String>>,
    /// Blob storage backend.
    pub blob_backend: BlobBackend,
    /// Log output format.
    pub log_format: LogFormat,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("credentials", &self.credentials)
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[REDACTED]"),
            )
            .field("blob_backend", &self.blob_backend)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            credentials: None,
            database_url: None,
            blob_backend: BlobBackend::Memory,
            log_format: LogFormat::Text,
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to
    /// its value. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let port = parse_number(&get, "PORT", 8080u16)?;
        let max_upload_bytes =
            parse_number(&get, "DOCFS_MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?;

        let credentials = match (get("DOCFS_USERNAME"), get("DOCFS_PASSWORD")) {
            (Some(username), Some(password)) => Some(BasicCredentials::new(username, password)),
            (None, None) => {
                tracing::warn!(
                    "DOCFS_USERNAME/DOCFS_PASSWORD not set, authentication is disabled"
                );
                None
            }
            _ => {
                tracing::warn!(
                    "only one of DOCFS_USERNAME/DOCFS_PASSWORD is set, authentication is disabled"
                );
                None
            }
        };

        let database_url = match get("DATABASE_URL") {
            Some(raw) => {
                check_url("DATABASE_URL", &raw)?;
                Some(Zeroizing::new(raw))
            }
            None => None,
        };

        let public_base_url = match get("DOCFS_PUBLIC_BASE_URL") {
            Some(raw) => {
                check_url("DOCFS_PUBLIC_BASE_URL", &raw)?;
                Some(raw)
            }
            None => None,
        };

        let blob_backend = match get("DOCFS_BLOB_BACKEND")
            .unwrap_or_else(|| "memory".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "memory" => BlobBackend::Memory,
            "fs" | "filesystem" => {
                let root = PathBuf::from(get("DOCFS_BLOB_ROOT").unwrap_or_else(|| "./blobs".into()));
                let public_base_url =
                    public_base_url.unwrap_or_else(|| format!("file://{}", root.display()));
                BlobBackend::Filesystem {
                    root,
                    public_base_url,
                }
            }
            "s3" => {
                let mut settings = S3Settings::new(
                    get("DOCFS_BUCKET").unwrap_or_else(|| "docfs".into()),
                    get("AWS_REGION").unwrap_or_else(|| "us-east-1".into()),
                );
                match (get("AWS_ACCESS_KEY_ID"), get("AWS_SECRET_ACCESS_KEY")) {
                    (Some(id), Some(secret)) => {
                        settings.access_key_id = Some(id);
                        settings.secret_access_key = Some(Zeroizing::new(secret));
                    }
                    (None, None) => {}
                    _ => return Err(ConfigError::PartialAwsCredentials),
                }
                if let Some(endpoint) = get("AWS_ENDPOINT_URL") {
                    check_url("AWS_ENDPOINT_URL", &endpoint)?;
                    settings.endpoint_url = Some(endpoint);
                }
                settings.public_base_url = public_base_url;
                BlobBackend::S3(settings)
            }
            other => return Err(ConfigError::UnknownBlobBackend(other.to_string())),
        };

        let log_format = match get("LOG_FORMAT").map(|v| v.to_ascii_lowercase()).as_deref() {
            None | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => return Err(ConfigError::UnknownLogFormat(other.to_string())),
        };

        Ok(Self {
            port,
            max_upload_bytes,
            credentials,
            database_url,
            blob_backend,
            log_format,
        })
    }
}

fn parse_number<T, G>(get: &G, var: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(var) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidNumber {
            var: var.to_string(),
            value: raw,
        }),
        None => Ok(default),
    }
}

fn check_url(var: &str, raw: &str) -> Result<(), ConfigError> {
    Url::parse(raw)
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string()))
}

/// Configuration errors. Startup aborts on any of these.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be a non-negative integer, got {value:?}")]
    InvalidNumber { var: String, value: String },
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("DOCFS_BLOB_BACKEND must be one of memory, fs, s3; got {0:?}")]
    UnknownBlobBackend(String),
    #[error("LOG_FORMAT must be text or json; got {0:?}")]
    UnknownLogFormat(String),
    #[error("AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY must be set together")]
    PartialAwsCredentials,
}
