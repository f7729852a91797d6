//! # Metadata Store Contract
//!
//! Durable CRUD for namespaces, projects, documents and links.
//!
//! Implementations must enforce the same constraints a relational schema
//! would:
//!
//! - namespace names are unique, project ids are unique per namespace
//! - at most one document per content digest
//! - at most one link per `(project, document)` pair
//! - projects reference an existing namespace, links reference an existing
//!   project and document
//!
//! A violated uniqueness rule is [`StoreError::Conflict`], a dangling
//! reference is [`StoreError::MissingParent`]. A rejected write leaves no
//! partial state visible to readers.
//!
//! Lookups return `Ok(None)` for a missing row; they never error for absence.

use async_trait::async_trait;
use docfs_core::{
    ContentDigest, Document, DocumentId, Link, LinkId, Namespace, NamespaceName, Project,
    ProjectId,
};

use crate::error::StoreError;

/// Persistence for the four catalog entities.
#[async_trait]
pub trait MetadataStore: Send + Sync + std::fmt::Debug {
    // -- Namespaces --

    /// Insert a namespace. Duplicate names are a conflict.
    async fn insert_namespace(&self, namespace: &Namespace) -> Result<(), StoreError>;

    /// Fetch a namespace by name.
    async fn get_namespace(&self, name: &NamespaceName) -> Result<Option<Namespace>, StoreError>;

    /// All namespaces, ordered by name.
    async fn list_namespaces(&self) -> Result<Vec<Namespace>, StoreError>;

    /// Number of projects owned by a namespace.
    async fn count_projects(&self, name: &NamespaceName) -> Result<u64, StoreError>;

    /// Delete a namespace with its projects and their links, atomically.
    ///
    /// Returns `false` if the namespace did not exist.
    async fn delete_namespace(&self, name: &NamespaceName) -> Result<bool, StoreError>;

    // -- Projects --

    /// Insert a project. The namespace must exist.
    async fn insert_project(&self, project: &Project) -> Result<(), StoreError>;

    /// Fetch a project by its composite key.
    async fn get_project(
        &self,
        namespace: &NamespaceName,
        id: &ProjectId,
    ) -> Result<Option<Project>, StoreError>;

    /// Projects of a namespace, ordered by id.
    async fn list_projects(&self, namespace: &NamespaceName) -> Result<Vec<Project>, StoreError>;

    /// Number of documents linked to a project.
    async fn count_documents(
        &self,
        namespace: &NamespaceName,
        id: &ProjectId,
    ) -> Result<u64, StoreError>;

    /// Documents linked to a project, in link creation order.
    async fn list_project_documents(
        &self,
        namespace: &NamespaceName,
        id: &ProjectId,
    ) -> Result<Vec<Document>, StoreError>;

    /// Delete a project and its links, atomically. Documents are untouched.
    ///
    /// Returns `false` if the project did not exist.
    async fn delete_project(
        &self,
        namespace: &NamespaceName,
        id: &ProjectId,
    ) -> Result<bool, StoreError>;

    // -- Documents --

    /// Insert a document. A second document with the same digest is a conflict.
    async fn insert_document(&self, document: &Document) -> Result<(), StoreError>;

    /// Fetch a document by surrogate id.
    async fn get_document(&self, id: DocumentId) -> Result<Option<Document>, StoreError>;

    /// Fetch the document holding `digest`, if any.
    async fn find_document_by_digest(
        &self,
        digest: &ContentDigest,
    ) -> Result<Option<Document>, StoreError>;

    /// All documents, in creation order.
    async fn list_documents(&self) -> Result<Vec<Document>, StoreError>;

    // -- Links --

    /// Insert a link. Project and document must exist; the pair must be new.
    async fn insert_link(&self, link: &Link) -> Result<(), StoreError>;

    /// The link filing `document` under the given project, if any.
    async fn find_link(
        &self,
        namespace: &NamespaceName,
        project: &ProjectId,
        document: DocumentId,
    ) -> Result<Option<Link>, StoreError>;

    /// Delete one link. Returns `false` if it did not exist.
    async fn delete_link(&self, id: LinkId) -> Result<bool, StoreError>;

    /// All links, in creation order.
    async fn list_links(&self) -> Result<Vec<Link>, StoreError>;
}
