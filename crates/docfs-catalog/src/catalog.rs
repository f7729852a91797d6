//! # Catalog Service
//!
//! Business operations over namespaces, projects and documents. Every
//! operation returns a typed [`CatalogError`] for expected conditions
//! (missing entity, oversized upload, name collision) instead of failing
//! hard; only blob and metadata infrastructure failures surface as
//! [`CatalogError::Storage`] / [`CatalogError::Metadata`].
//!
//! Path keys arrive as raw strings. A key that fails validation cannot name
//! an existing entity, so lookups report it as NotFound while creates report
//! it as NotSaved.

use std::collections::HashMap;
use std::sync::Arc;

use docfs_blob::BlobStore;
use docfs_core::{
    Document, DocumentId, DocumentView, Link, LinkView, Located, Namespace, NamespaceName,
    Project, ProjectId,
};

use crate::dedup::Deduplicator;
use crate::error::{CatalogError, StoreError};
use crate::store::MetadataStore;

/// Default upload ceiling: 25 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 25 * 1024 * 1024;

/// Location name of the root listing.
pub const ROOT_LOCATION: &str = "root";

/// Tunables passed to [`Catalog::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSettings {
    /// Largest accepted upload, in bytes.
    pub max_upload_bytes: u64,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// A file received for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Display name supplied by the client.
    pub name: String,
    /// Full payload.
    pub bytes: Vec<u8>,
}

/// Result of attaching a file to a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// The link filing the document under the project.
    pub link: Link,
    /// The (possibly pre-existing) document.
    pub document: Document,
}

impl Attachment {
    /// Default view of a link: the document it points at.
    pub fn view(&self) -> DocumentView {
        self.document.view()
    }
}

/// Document bytes plus the record they belong to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentBytes {
    /// The catalogued document.
    pub document: Document,
    /// Its content.
    pub bytes: Vec<u8>,
}

impl DocumentBytes {
    /// Display name for download.
    pub fn name(&self) -> &str {
        &self.document.name
    }
}

/// The catalog service.
#[derive(Debug, Clone)]
pub struct Catalog {
    metadata: Arc<dyn MetadataStore>,
    blobs: Arc<dyn BlobStore>,
    dedup: Deduplicator,
    settings: CatalogSettings,
}

impl Catalog {
    /// Build a catalog over the given stores.
    pub fn new(
        metadata: Arc<dyn MetadataStore>,
        blobs: Arc<dyn BlobStore>,
        settings: CatalogSettings,
    ) -> Self {
        let dedup = Deduplicator::new(Arc::clone(&metadata), Arc::clone(&blobs));
        Self {
            metadata,
            blobs,
            dedup,
            settings,
        }
    }

    /// Active settings.
    pub fn settings(&self) -> &CatalogSettings {
        &self.settings
    }

    /// The deduplication engine used for uploads.
    pub fn deduplicator(&self) -> &Deduplicator {
        &self.dedup
    }

    // -- Namespaces -----------------------------------------------------------

    /// Create a namespace. An existing name is [`CatalogError::AlreadyExists`].
    pub async fn create_namespace(&self, name: &str) -> Result<Namespace, CatalogError> {
        let namespace = Namespace::new(NamespaceName::new(name)?);
        match self.metadata.insert_namespace(&namespace).await {
            Ok(()) => {
                tracing::info!(namespace = %namespace.name, "namespace created");
                Ok(namespace)
            }
            Err(StoreError::Conflict(_)) => Err(CatalogError::AlreadyExists {
                entity: "namespace",
                key: namespace.name.to_string(),
            }),
            Err(err) => Err(err.into()),
        }
    }

    /// Fetch a namespace. Never creates.
    pub async fn get_namespace(&self, name: &str) -> Result<Namespace, CatalogError> {
        let key = lookup_namespace_name(name)?;
        self.metadata
            .get_namespace(&key)
            .await?
            .ok_or_else(|| CatalogError::not_found("namespace", &key))
    }

    /// Fetch a namespace, creating it if absent.
    pub async fn get_or_create_namespace(&self, name: &str) -> Result<Namespace, CatalogError> {
        let key = NamespaceName::new(name)?;
        if let Some(existing) = self.metadata.get_namespace(&key).await? {
            return Ok(existing);
        }
        let namespace = Namespace::new(key);
        match self.metadata.insert_namespace(&namespace).await {
            Ok(()) => {
                tracing::info!(namespace = %namespace.name, "namespace created on demand");
                Ok(namespace)
            }
            Err(StoreError::Conflict(_)) => self
                .metadata
                .get_namespace(&namespace.name)
                .await?
                .ok_or_else(|| CatalogError::not_found("namespace", &namespace.name)),
            Err(err) => Err(err.into()),
        }
    }

    /// Listing of every namespace under the root location.
    pub async fn root_listing(&self) -> Result<Located, CatalogError> {
        let namespaces = self.metadata.list_namespaces().await?;
        let mut views = Vec::with_capacity(namespaces.len());
        for namespace in &namespaces {
            let count = self.metadata.count_projects(&namespace.name).await?;
            views.push(namespace.view(count));
        }
        Ok(Located::named(ROOT_LOCATION, views))
    }

    /// Listing of the projects owned by a namespace.
    pub async fn namespace_listing(&self, name: &str) -> Result<Located, CatalogError> {
        let namespace = self.get_namespace(name).await?;
        let projects = self.metadata.list_projects(&namespace.name).await?;
        let mut views = Vec::with_capacity(projects.len());
        for project in &projects {
            let count = self
                .metadata
                .count_documents(&project.namespace, &project.id)
                .await?;
            views.push(project.view(count));
        }
        Ok(Located::named(namespace.name.as_str(), views))
    }

    /// Delete a namespace together with its projects and their links.
    ///
    /// Documents are kept.
    pub async fn delete_namespace(&self, name: &str) -> Result<(), CatalogError> {
        let key = lookup_namespace_name(name)?;
        match self.metadata.delete_namespace(&key).await {
            Ok(true) => {
                tracing::info!(namespace = %key, "namespace deleted");
                Ok(())
            }
            Ok(false) => Err(CatalogError::not_found("namespace", &key)),
            Err(err) => {
                tracing::error!(namespace = %key, error = %err, "namespace delete failed");
                Err(CatalogError::NotDeleted(format!("namespace {key}")))
            }
        }
    }

    // -- Projects -------------------------------------------------------------

    /// Create a project under an existing namespace.
    pub async fn create_project(
        &self,
        namespace: &str,
        project_id: &str,
    ) -> Result<Project, CatalogError> {
        let namespace = self.get_namespace(namespace).await?;
        let project = Project::new(namespace.name, ProjectId::new(project_id)?);
        match self.metadata.insert_project(&project).await {
            Ok(()) => {
                tracing::info!(namespace = %project.namespace, project = %project.id, "project created");
                Ok(project)
            }
            Err(StoreError::Conflict(_)) => Err(CatalogError::AlreadyExists {
                entity: "project",
                key: format!("{}/{}", project.namespace, project.id),
            }),
            Err(StoreError::MissingParent(_)) => {
                Err(CatalogError::not_found("namespace", &project.namespace))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Fetch a project. Never creates.
    pub async fn get_project(
        &self,
        namespace: &str,
        project_id: &str,
    ) -> Result<Project, CatalogError> {
        let namespace = self.get_namespace(namespace).await?;
        let id = ProjectId::new(project_id).map_err(|_| {
            CatalogError::not_found("project", format!("{}/{}", namespace.name, project_id.trim()))
        })?;
        self.metadata
            .get_project(&namespace.name, &id)
            .await?
            .ok_or_else(|| CatalogError::not_found("project", format!("{}/{id}", namespace.name)))
    }

    /// Fetch a project, creating it (and its namespace) if absent.
    pub async fn get_or_create_project(
        &self,
        namespace: &str,
        project_id: &str,
    ) -> Result<Project, CatalogError> {
        let namespace = self.get_or_create_namespace(namespace).await?;
        let id = ProjectId::new(project_id)?;
        if let Some(existing) = self.metadata.get_project(&namespace.name, &id).await? {
            return Ok(existing);
        }
        let project = Project::new(namespace.name, id);
        match self.metadata.insert_project(&project).await {
            Ok(()) => {
                tracing::info!(namespace = %project.namespace, project = %project.id, "project created on demand");
                Ok(project)
            }
            Err(StoreError::Conflict(_)) => self
                .metadata
                .get_project(&project.namespace, &project.id)
                .await?
                .ok_or_else(|| {
                    CatalogError::not_found(
                        "project",
                        format!("{}/{}", project.namespace, project.id),
                    )
                }),
            Err(StoreError::MissingParent(_)) => {
                Err(CatalogError::not_found("namespace", &project.namespace))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Listing of the documents linked to a project.
    pub async fn project_listing(
        &self,
        namespace: &str,
        project_id: &str,
    ) -> Result<Located, CatalogError> {
        let project = self.get_project(namespace, project_id).await?;
        let documents = self
            .metadata
            .list_project_documents(&project.namespace, &project.id)
            .await?;
        let views: Vec<DocumentView> = documents.iter().map(Document::view).collect();
        Ok(Located::named(project.id.as_str(), views))
    }

    /// Delete a project and its links. Documents are kept.
    pub async fn delete_project(
        &self,
        namespace: &str,
        project_id: &str,
    ) -> Result<(), CatalogError> {
        let project = self.get_project(namespace, project_id).await?;
        match self
            .metadata
            .delete_project(&project.namespace, &project.id)
            .await
        {
            Ok(true) => {
                tracing::info!(namespace = %project.namespace, project = %project.id, "project deleted");
                Ok(())
            }
            Ok(false) => Err(CatalogError::not_found(
                "project",
                format!("{}/{}", project.namespace, project.id),
            )),
            Err(err) => {
                tracing::error!(
                    namespace = %project.namespace,
                    project = %project.id,
                    error = %err,
                    "project delete failed"
                );
                Err(CatalogError::NotDeleted(format!(
                    "project {}/{}",
                    project.namespace, project.id
                )))
            }
        }
    }

    // -- Documents ------------------------------------------------------------

    /// Store `file` (deduplicated by content) and file it under a project.
    ///
    /// Attaching content the project already holds returns the existing link.
    pub async fn attach_document(
        &self,
        namespace: &str,
        project_id: &str,
        file: Option<UploadedFile>,
    ) -> Result<Attachment, CatalogError> {
        let file = file.ok_or(CatalogError::NoFileReceived)?;
        let project = self.get_project(namespace, project_id).await?;

        let name = file.name.trim();
        if name.is_empty() {
            return Err(CatalogError::NotSaved("file name must not be empty".into()));
        }

        let size = file.bytes.len() as u64;
        if size > self.settings.max_upload_bytes {
            tracing::warn!(
                namespace = %project.namespace,
                project = %project.id,
                size,
                max = self.settings.max_upload_bytes,
                "upload rejected: too large"
            );
            return Err(CatalogError::FileTooLarge {
                size,
                max: self.settings.max_upload_bytes,
            });
        }

        let document = self.dedup.find_or_store(&file.bytes, name).await?;

        if let Some(link) = self.existing_link(&project, document.id).await? {
            return Ok(Attachment { link, document });
        }

        let link = Link::new(&project, document.id);
        match self.metadata.insert_link(&link).await {
            Ok(()) => {
                tracing::info!(
                    namespace = %project.namespace,
                    project = %project.id,
                    document_id = %document.id,
                    link_id = %link.id,
                    "document attached"
                );
                Ok(Attachment { link, document })
            }
            Err(StoreError::Conflict(_)) => match self.existing_link(&project, document.id).await? {
                Some(link) => Ok(Attachment { link, document }),
                None => Err(CatalogError::NotSaved(format!(
                    "link for document {} conflicted but could not be re-read",
                    document.id
                ))),
            },
            Err(StoreError::MissingParent(msg)) => {
                tracing::warn!(document_id = %document.id, reason = %msg, "link target vanished");
                Err(CatalogError::not_found(
                    "project",
                    format!("{}/{}", project.namespace, project.id),
                ))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Remove the link filing a document under a project. The document stays.
    pub async fn detach_document(
        &self,
        namespace: &str,
        project_id: &str,
        document_id: &str,
    ) -> Result<(), CatalogError> {
        let (project, link) = self.resolve_link(namespace, project_id, document_id).await?;
        match self.metadata.delete_link(link.id).await {
            Ok(true) => {
                tracing::info!(
                    namespace = %project.namespace,
                    project = %project.id,
                    document_id = %link.document_id,
                    "document detached"
                );
                Ok(())
            }
            Ok(false) => Err(CatalogError::not_found("link", link.id)),
            Err(err) => {
                tracing::error!(link_id = %link.id, error = %err, "link delete failed");
                Err(CatalogError::NotDeleted(format!("link {}", link.id)))
            }
        }
    }

    /// Every link, expanded with its document.
    pub async fn list_links(&self) -> Result<Vec<LinkView>, CatalogError> {
        let documents: HashMap<DocumentId, Document> = self
            .metadata
            .list_documents()
            .await?
            .into_iter()
            .map(|d| (d.id, d))
            .collect();
        let links = self.metadata.list_links().await?;

        let mut views = Vec::with_capacity(links.len());
        for link in &links {
            match documents.get(&link.document_id) {
                Some(document) => views.push(LinkView::new(link, document)),
                None => {
                    tracing::warn!(link_id = %link.id, document_id = %link.document_id, "link points at a missing document");
                }
            }
        }
        Ok(views)
    }

    /// Every document, linked or not.
    pub async fn list_documents(&self) -> Result<Vec<Document>, CatalogError> {
        Ok(self.metadata.list_documents().await?)
    }

    /// Fetch a document's bytes by id.
    pub async fn fetch_document_bytes(
        &self,
        document_id: &str,
    ) -> Result<DocumentBytes, CatalogError> {
        let id = parse_document_id(document_id)?;
        let document = self
            .metadata
            .get_document(id)
            .await?
            .ok_or_else(|| CatalogError::not_found("document", id))?;
        self.read_bytes(document).await
    }

    /// Fetch a document's bytes, provided it is filed under the given project.
    pub async fn fetch_project_document(
        &self,
        namespace: &str,
        project_id: &str,
        document_id: &str,
    ) -> Result<DocumentBytes, CatalogError> {
        let (_, link) = self.resolve_link(namespace, project_id, document_id).await?;
        let document = self
            .metadata
            .get_document(link.document_id)
            .await?
            .ok_or_else(|| CatalogError::not_found("document", link.document_id))?;
        self.read_bytes(document).await
    }

    // -- Helpers --------------------------------------------------------------

    async fn existing_link(
        &self,
        project: &Project,
        document: DocumentId,
    ) -> Result<Option<Link>, CatalogError> {
        Ok(self
            .metadata
            .find_link(&project.namespace, &project.id, document)
            .await?)
    }

    async fn resolve_link(
        &self,
        namespace: &str,
        project_id: &str,
        document_id: &str,
    ) -> Result<(Project, Link), CatalogError> {
        let project = self.get_project(namespace, project_id).await?;
        let id = parse_document_id(document_id)?;
        let link = self
            .existing_link(&project, id)
            .await?
            .ok_or_else(|| {
                CatalogError::not_found(
                    "document",
                    format!("{}/{}/{id}", project.namespace, project.id),
                )
            })?;
        Ok((project, link))
    }

    async fn read_bytes(&self, document: Document) -> Result<DocumentBytes, CatalogError> {
        let bytes = self.blobs.get(&document.url).await.map_err(|err| {
            tracing::error!(document_id = %document.id, url = %document.url, error = %err, "blob read failed");
            CatalogError::Storage(err)
        })?;
        Ok(DocumentBytes { document, bytes })
    }
}

fn lookup_namespace_name(raw: &str) -> Result<NamespaceName, CatalogError> {
    NamespaceName::new(raw).map_err(|_| CatalogError::not_found("namespace", raw.trim()))
}

fn parse_document_id(raw: &str) -> Result<DocumentId, CatalogError> {
    raw.parse()
        .map_err(|_| CatalogError::not_found("document", raw.trim()))
}
