//! # In-Memory Metadata Store
//!
//! All four tables live behind one `parking_lot::RwLock`, so every write
//! (including a cascade delete) is a single critical section and readers
//! never observe a half-applied change. The lock is never held across an
//! `.await`.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use docfs_core::{
    ContentDigest, Document, DocumentId, Link, LinkId, Namespace, NamespaceName, Project,
    ProjectId,
};
use parking_lot::RwLock;

use crate::error::StoreError;
use crate::store::MetadataStore;

type ProjectKey = (NamespaceName, ProjectId);

#[derive(Debug, Default)]
struct Tables {
    namespaces: BTreeMap<NamespaceName, Namespace>,
    projects: BTreeMap<ProjectKey, Project>,
    documents: HashMap<DocumentId, Document>,
    documents_by_digest: HashMap<ContentDigest, DocumentId>,
    document_order: Vec<DocumentId>,
    links: Vec<Link>,
}

impl Tables {
    fn links_of<'a>(
        &'a self,
        namespace: &'a NamespaceName,
        id: &'a ProjectId,
    ) -> impl Iterator<Item = &'a Link> + 'a {
        self.links
            .iter()
            .filter(move |l| &l.namespace == namespace && &l.project_id == id)
    }
}

/// Thread-safe, cloneable [`MetadataStore`] held entirely in memory.
///
/// Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryMetadataStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryMetadataStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MetadataStore for MemoryMetadataStore {
    async fn insert_namespace(&self, namespace: &Namespace) -> Result<(), StoreError> {
        let mut tables = self.tables.write();
        if tables.namespaces.contains_key(&namespace.name) {
            return Err(StoreError::Conflict(format!(
                "namespace {} already exists",
                namespace.name
            )));
        }
        tables
            .namespaces
            .insert(namespace.name.clone(), namespace.clone());
        Ok(())
    }

    async fn get_namespace(&self, name: &NamespaceName) -> Result<Option<Namespace>, StoreError> {
        Ok(self.tables.read().namespaces.get(name).cloned())
    }

    async fn list_namespaces(&self) -> Result<Vec<Namespace>, StoreError> {
        Ok(self.tables.read().namespaces.values().cloned().collect())
    }

    async fn count_projects(&self, name: &NamespaceName) -> Result<u64, StoreError> {
        let tables = self.tables.read();
        Ok(tables.projects.keys().filter(|(ns, _)| ns == name).count() as u64)
    }

    async fn delete_namespace(&self, name: &NamespaceName) -> Result<bool, StoreError> {
        let mut tables = self.tables.write();
        if !tables.namespaces.contains_key(name) {
            return Ok(false);
        }
        tables.links.retain(|l| &l.namespace != name);
        tables.projects.retain(|(ns, _), _| ns != name);
        tables.namespaces.remove(name);
        Ok(true)
    }

    async fn insert_project(&self, project: &Project) -> Result<(), StoreError> {
        let mut tables = self.tables.write();
        if !tables.namespaces.contains_key(&project.namespace) {
            return Err(StoreError::MissingParent(format!(
                "namespace {} does not exist",
                project.namespace
            )));
        }
        let key = (project.namespace.clone(), project.id.clone());
        if tables.projects.contains_key(&key) {
            return Err(StoreError::Conflict(format!(
                "project {}/{} already exists",
                project.namespace, project.id
            )));
        }
        tables.projects.insert(key, project.clone());
        Ok(())
    }

    async fn get_project(
        &self,
        namespace: &NamespaceName,
        id: &ProjectId,
    ) -> Result<Option<Project>, StoreError> {
        let key = (namespace.clone(), id.clone());
        Ok(self.tables.read().projects.get(&key).cloned())
    }

    async fn list_projects(&self, namespace: &NamespaceName) -> Result<Vec<Project>, StoreError> {
        let tables = self.tables.read();
        Ok(tables
            .projects
            .iter()
            .filter(|((ns, _), _)| ns == namespace)
            .map(|(_, p)| p.clone())
            .collect())
    }

    async fn count_documents(
        &self,
        namespace: &NamespaceName,
        id: &ProjectId,
    ) -> Result<u64, StoreError> {
        Ok(self.tables.read().links_of(namespace, id).count() as u64)
    }

    async fn list_project_documents(
        &self,
        namespace: &NamespaceName,
        id: &ProjectId,
    ) -> Result<Vec<Document>, StoreError> {
        let tables = self.tables.read();
        Ok(tables
            .links_of(namespace, id)
            .filter_map(|l| tables.documents.get(&l.document_id).cloned())
            .collect())
    }

    async fn delete_project(
        &self,
        namespace: &NamespaceName,
        id: &ProjectId,
    ) -> Result<bool, StoreError> {
        let mut tables = self.tables.write();
        let key = (namespace.clone(), id.clone());
        if !tables.projects.contains_key(&key) {
            return Ok(false);
        }
        tables
            .links
            .retain(|l| !(&l.namespace == namespace && &l.project_id == id));
        tables.projects.remove(&key);
        Ok(true)
    }

    async fn insert_document(&self, document: &Document) -> Result<(), StoreError> {
        let mut tables = self.tables.write();
        if tables.documents_by_digest.contains_key(&document.md5) {
            return Err(StoreError::Conflict(format!(
                "document with digest {} already exists",
                document.md5
            )));
        }
        if tables.documents.contains_key(&document.id) {
            return Err(StoreError::Conflict(format!(
                "document {} already exists",
                document.id
            )));
        }
        tables.documents_by_digest.insert(document.md5, document.id);
        tables.document_order.push(document.id);
        tables.documents.insert(document.id, document.clone());
        Ok(())
    }

    async fn get_document(&self, id: DocumentId) -> Result<Option<Document>, StoreError> {
        Ok(self.tables.read().documents.get(&id).cloned())
    }

    async fn find_document_by_digest(
        &self,
        digest: &ContentDigest,
    ) -> Result<Option<Document>, StoreError> {
        let tables = self.tables.read();
        Ok(tables
            .documents_by_digest
            .get(digest)
            .and_then(|id| tables.documents.get(id))
            .cloned())
    }

    async fn list_documents(&self) -> Result<Vec<Document>, StoreError> {
        let tables = self.tables.read();
        Ok(tables
            .document_order
            .iter()
            .filter_map(|id| tables.documents.get(id).cloned())
            .collect())
    }

    async fn insert_link(&self, link: &Link) -> Result<(), StoreError> {
        let mut tables = self.tables.write();
        let key = (link.namespace.clone(), link.project_id.clone());
        if !tables.projects.contains_key(&key) {
            return Err(StoreError::MissingParent(format!(
                "project {}/{} does not exist",
                link.namespace, link.project_id
            )));
        }
        if !tables.documents.contains_key(&link.document_id) {
            return Err(StoreError::MissingParent(format!(
                "document {} does not exist",
                link.document_id
            )));
        }
        let duplicate = tables.links.iter().any(|l| {
            l.id == link.id
                || (l.namespace == link.namespace
                    && l.project_id == link.project_id
                    && l.document_id == link.document_id)
        });
        if duplicate {
            return Err(StoreError::Conflict(format!(
                "document {} is already linked to {}/{}",
                link.document_id, link.namespace, link.project_id
            )));
        }
        tables.links.push(link.clone());
        Ok(())
    }

    async fn find_link(
        &self,
        namespace: &NamespaceName,
        project: &ProjectId,
        document: DocumentId,
    ) -> Result<Option<Link>, StoreError> {
        let tables = self.tables.read();
        let found = tables
            .links_of(namespace, project)
            .find(|l| l.document_id == document)
            .cloned();
        Ok(found)
    }

    async fn delete_link(&self, id: LinkId) -> Result<bool, StoreError> {
        let mut tables = self.tables.write();
        let before = tables.links.len();
        tables.links.retain(|l| l.id != id);
        Ok(tables.links.len() != before)
    }

    async fn list_links(&self) -> Result<Vec<Link>, StoreError> {
        Ok(self.tables.read().links.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ns(name: &str) -> Namespace {
        Namespace::new(NamespaceName::new(name).unwrap())
    }

    fn project(namespace: &str, id: &str) -> Project {
        Project::new(
            NamespaceName::new(namespace).unwrap(),
            ProjectId::new(id).unwrap(),
        )
    }

    fn document(bytes: &[u8], name: &str) -> Document {
        let md5 = ContentDigest::of(bytes);
        Document::new(md5, format!("memory://docfs/{md5}"), name, bytes.len() as u64)
    }

    #[tokio::test]
    async fn duplicate_namespace_conflicts() {
        let store = MemoryMetadataStore::new();
        store.insert_namespace(&ns("wb")).await.unwrap();
        let err = store.insert_namespace(&ns("wb")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn project_requires_namespace() {
        let store = MemoryMetadataStore::new();
        let err = store.insert_project(&project("nope", "p1")).await.unwrap_err();
        assert!(matches!(err, StoreError::MissingParent(_)));
        let name = NamespaceName::new("nope").unwrap();
        assert!(store.list_projects(&name).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn project_ids_are_scoped_to_namespace() {
        let store = MemoryMetadataStore::new();
        store.insert_namespace(&ns("a")).await.unwrap();
        store.insert_namespace(&ns("b")).await.unwrap();
        store.insert_project(&project("a", "p1")).await.unwrap();
        store.insert_project(&project("b", "p1")).await.unwrap();
        assert!(matches!(
            store.insert_project(&project("a", "p1")).await,
            Err(StoreError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn digest_is_unique() {
        let store = MemoryMetadataStore::new();
        store.insert_document(&document(b"same", "a.txt")).await.unwrap();
        let err = store
            .insert_document(&document(b"same", "b.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert_eq!(store.list_documents().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn link_pair_is_unique() {
        let store = MemoryMetadataStore::new();
        store.insert_namespace(&ns("wb")).await.unwrap();
        let p = project("wb", "p1");
        store.insert_project(&p).await.unwrap();
        let doc = document(b"x", "x.txt");
        store.insert_document(&doc).await.unwrap();

        store.insert_link(&Link::new(&p, doc.id)).await.unwrap();
        let err = store.insert_link(&Link::new(&p, doc.id)).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn find_link_matches_project_and_document() {
        let store = MemoryMetadataStore::new();
        store.insert_namespace(&ns("wb")).await.unwrap();
        let p1 = project("wb", "p1");
        let p2 = project("wb", "p2");
        store.insert_project(&p1).await.unwrap();
        store.insert_project(&p2).await.unwrap();
        let doc = document(b"x", "x.txt");
        store.insert_document(&doc).await.unwrap();
        let link = Link::new(&p1, doc.id);
        store.insert_link(&link).await.unwrap();

        let found = store
            .find_link(&p1.namespace, &p1.id, doc.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, link.id);
        assert!(store
            .find_link(&p2.namespace, &p2.id, doc.id)
            .await
            .unwrap()
            .is_none());
        assert!(store
            .find_link(&p1.namespace, &p1.id, DocumentId::new())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn link_requires_document() {
        let store = MemoryMetadataStore::new();
        store.insert_namespace(&ns("wb")).await.unwrap();
        let p = project("wb", "p1");
        store.insert_project(&p).await.unwrap();
        let err = store
            .insert_link(&Link::new(&p, DocumentId::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingParent(_)));
    }

    #[tokio::test]
    async fn namespace_cascade_keeps_documents() {
        let store = MemoryMetadataStore::new();
        store.insert_namespace(&ns("wb")).await.unwrap();
        store.insert_namespace(&ns("other")).await.unwrap();
        let p1 = project("wb", "p1");
        let p2 = project("other", "p1");
        store.insert_project(&p1).await.unwrap();
        store.insert_project(&p2).await.unwrap();
        let doc = document(b"shared", "s.txt");
        store.insert_document(&doc).await.unwrap();
        store.insert_link(&Link::new(&p1, doc.id)).await.unwrap();
        store.insert_link(&Link::new(&p2, doc.id)).await.unwrap();

        let name = NamespaceName::new("wb").unwrap();
        assert!(store.delete_namespace(&name).await.unwrap());
        assert!(store.get_namespace(&name).await.unwrap().is_none());
        assert_eq!(store.count_projects(&name).await.unwrap(), 0);

        let links = store.list_links().await.unwrap();
        assert_eq!(links.len(), 1);
        assert!(links[0].belongs_to(&p2));
        assert!(store.get_document(doc.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn delete_missing_reports_false() {
        let store = MemoryMetadataStore::new();
        let name = NamespaceName::new("ghost").unwrap();
        assert!(!store.delete_namespace(&name).await.unwrap());
        assert!(!store
            .delete_project(&name, &ProjectId::new("p").unwrap())
            .await
            .unwrap());
        assert!(!store.delete_link(LinkId::new()).await.unwrap());
    }

    #[tokio::test]
    async fn project_documents_follow_link_order() {
        let store = MemoryMetadataStore::new();
        store.insert_namespace(&ns("wb")).await.unwrap();
        let p = project("wb", "p1");
        store.insert_project(&p).await.unwrap();
        let first = document(b"one", "1.txt");
        let second = document(b"two", "2.txt");
        store.insert_document(&second).await.unwrap();
        store.insert_document(&first).await.unwrap();
        store.insert_link(&Link::new(&p, first.id)).await.unwrap();
        store.insert_link(&Link::new(&p, second.id)).await.unwrap();

        let docs = store
            .list_project_documents(&p.namespace, &p.id)
            .await
            .unwrap();
        assert_eq!(docs, vec![first, second]);
        assert_eq!(store.count_documents(&p.namespace, &p.id).await.unwrap(), 2);
    }
}
