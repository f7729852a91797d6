#![deny(missing_docs)]

//! # docfs-core — Foundational Types for docfs
//!
//! docfs is a content-addressed file catalog: documents are filed under a
//! two-level hierarchy (namespace → project), deduplicated by content digest,
//! and stored once in an object store no matter how many projects link them.
//!
//! This crate holds the pieces every other crate agrees on. It performs no
//! I/O and depends only on `serde`, `thiserror`, `chrono`, `uuid`, `md-5`
//! and `utoipa`.
//!
//! ## Design Principles
//!
//! 1. **Newtype wrappers for keys.** A [`NamespaceName`] cannot be passed where
//!    a [`ProjectId`] is expected, and both are validated at construction.
//!
//! 2. **[`ContentDigest`] is the dedup key and the storage key.** Documents are
//!    never stored under their display name.
//!
//! 3. **Closed set of views.** Every entity has exactly one JSON view type in
//!    [`view`]; the API never serializes entities directly.

pub mod digest;
pub mod entity;
pub mod error;
pub mod identity;
pub mod view;

pub use digest::{md5_digest, ContentDigest};
pub use entity::{file_type_of, size_in_kb, Document, Link, Namespace, Project};
pub use error::ValidationError;
pub use identity::{DocumentId, LinkId, NamespaceName, ProjectId, MAX_KEY_LEN};
pub use view::{DocumentView, Located, Location, LinkView, NamespaceView, ProjectView, View};
