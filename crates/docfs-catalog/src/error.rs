//! Error types for the catalog and its metadata store.

use docfs_blob::BlobError;
use docfs_core::ValidationError;
use thiserror::Error;

/// Failures reported by a [`MetadataStore`](crate::MetadataStore).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A referenced parent row does not exist.
    #[error("missing parent: {0}")]
    MissingParent(String),

    /// The backing store failed (connection loss, timeout, driver error).
    #[error("metadata backend error: {0}")]
    Backend(String),
}

/// Outcome of a catalog operation that did not succeed.
///
/// Expected conditions (missing entity, oversized upload) are ordinary
/// variants. Only [`CatalogError::Storage`] and [`CatalogError::Metadata`]
/// represent infrastructure failures.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Entity lookup miss.
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// Create collided with an existing entity.
    #[error("{entity} already exists: {key}")]
    AlreadyExists { entity: &'static str, key: String },

    /// Validation or constraint failure on create.
    #[error("not saved: {0}")]
    NotSaved(String),

    /// A delete did not complete.
    #[error("not deleted: {0}")]
    NotDeleted(String),

    /// Upload request carried no file.
    #[error("no file received")]
    NoFileReceived,

    /// Upload exceeded the configured ceiling.
    #[error("file too large: {size} bytes exceeds the {max} byte limit")]
    FileTooLarge { size: u64, max: u64 },

    /// The blob store failed.
    #[error("blob storage unavailable: {0}")]
    Storage(#[from] BlobError),

    /// The metadata store failed.
    #[error("metadata store failure: {0}")]
    Metadata(#[from] StoreError),
}

impl CatalogError {
    pub(crate) fn not_found(entity: &'static str, key: impl std::fmt::Display) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }
}

impl From<ValidationError> for CatalogError {
    fn from(err: ValidationError) -> Self {
        Self::NotSaved(err.to_string())
    }
}
