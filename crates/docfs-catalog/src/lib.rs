//! # docfs-catalog — Catalog Service
//!
//! Ties the metadata store and the blob store together:
//!
//! - [`MetadataStore`]: persistence contract for namespaces, projects,
//!   documents and links, with [`MemoryMetadataStore`] as the in-process
//!   implementation. The Postgres implementation lives in `docfs-api`.
//! - [`Deduplicator`]: stores each distinct payload once, keyed by its MD5.
//! - [`Catalog`]: the operations the HTTP surface exposes.
//!
//! ## Ownership
//!
//! ```text
//! Namespace ──cascade──▶ Project ──cascade──▶ Link ──refers──▶ Document
//! ```
//!
//! Cascades stop at links. Documents are shared across projects and are
//! never deleted by the catalog, even when nothing links to them.

pub mod catalog;
pub mod dedup;
pub mod error;
pub mod memory;
pub mod store;

pub use catalog::{
    Attachment, Catalog, CatalogSettings, DocumentBytes, UploadedFile, DEFAULT_MAX_UPLOAD_BYTES,
    ROOT_LOCATION,
};
pub use dedup::Deduplicator;
pub use error::{CatalogError, StoreError};
pub use memory::MemoryMetadataStore;
pub use store::MetadataStore;
