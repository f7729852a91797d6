//! # docfs-blob — Content-Addressed Object Storage
//!
//! The [`BlobStore`] trait is the seam between the catalog and wherever
//! document bytes actually live. Keys are content digests, so a `put` of the
//! same key is idempotent and concurrent duplicate uploads are harmless.
//!
//! ## Backends
//!
//! | Backend | Type | Use |
//! |---------|------|-----|
//! | S3 | [`S3BlobStore`] | Production. Objects are written with a public-read ACL. |
//! | Filesystem | [`FsBlobStore`] | Single-node deployments and local development. |
//! | Memory | [`MemoryBlobStore`] | Tests. |
//!
//! Every backend hands out a URL from `put` and accepts that same URL in
//! `get`. A URL that does not belong to the backend is rejected with
//! [`BlobError::ForeignUrl`] rather than fetched.

pub mod error;
pub mod fs;
pub mod memory;
pub mod s3;

pub use error::BlobError;
pub use fs::FsBlobStore;
pub use memory::MemoryBlobStore;
pub use s3::{S3BlobStore, S3Settings};

use async_trait::async_trait;

/// Durable content-addressed storage.
#[async_trait]
pub trait BlobStore: Send + Sync + std::fmt::Debug {
    /// Public URL at which `key` is (or would be) stored.
    fn url_for(&self, key: &str) -> String;

    /// Store `data` under `key`, readable by anyone, and return its URL.
    ///
    /// Writing an existing key replaces it with identical bytes.
    async fn put(&self, key: &str, data: &[u8]) -> Result<String, BlobError>;

    /// Fetch the bytes stored at `url`.
    async fn get(&self, url: &str) -> Result<Vec<u8>, BlobError>;
}

/// Check that `key` is usable as a single object name.
pub fn validate_key(key: &str) -> Result<(), BlobError> {
    if key.is_empty() || key == "." || key == ".." || key.contains(['/', '\\']) {
        return Err(BlobError::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// Recover the object key from a URL produced by `url_for` with `base`.
pub fn key_from_url<'a>(base: &str, url: &'a str) -> Result<&'a str, BlobError> {
    let base = base.trim_end_matches('/');
    let key = url
        .strip_prefix(base)
        .and_then(|rest| rest.strip_prefix('/'))
        .ok_or_else(|| BlobError::ForeignUrl(url.to_string()))?;
    validate_key(key).map_err(|_| BlobError::ForeignUrl(url.to_string()))?;
    Ok(key)
}
