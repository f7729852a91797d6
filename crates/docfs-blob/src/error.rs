//! Error types for blob storage operations.

use thiserror::Error;

/// Errors from a [`BlobStore`](crate::BlobStore) backend.
#[derive(Error, Debug)]
pub enum BlobError {
    /// No object exists under the key.
    #[error("blob not found: {key}")]
    NotFound { key: String },

    /// The key cannot be used as a single object name.
    #[error("invalid blob key: \"{0}\"")]
    InvalidKey(String),

    /// The URL was not issued by this backend.
    #[error("url does not belong to this blob store: {0}")]
    ForeignUrl(String),

    /// The remote object store rejected or failed the request.
    #[error("object store error: {message}")]
    Backend { message: String, retryable: bool },

    /// Local I/O failure.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl BlobError {
    /// Whether retrying the same request could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Backend { retryable: true, .. })
    }
}
