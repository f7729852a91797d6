//! # Catalog Entities
//!
//! The four persisted entity types and the derivations applied when a
//! [`Document`] is first catalogued.
//!
//! ```text
//! Namespace 1 ── n Project n ── Link ── n Document
//! ```
//!
//! A Link is the only path from a Project to a Document. Deleting a Link
//! never deletes its Document; orphaned Documents are retained.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::digest::ContentDigest;
use crate::identity::{DocumentId, LinkId, NamespaceName, ProjectId};
use crate::view::{DocumentView, NamespaceView, ProjectView};

/// Top-level grouping, unique by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Namespace {
    /// Unique name; also the namespace's key.
    pub name: NamespaceName,
    /// When the namespace was created.
    pub created_at: DateTime<Utc>,
}

impl Namespace {
    /// Create a namespace record stamped with the current time.
    pub fn new(name: NamespaceName) -> Self {
        Self {
            name,
            created_at: Utc::now(),
        }
    }

    /// Canonical JSON view, given the number of projects it owns.
    pub fn view(&self, project_count: u64) -> NamespaceView {
        NamespaceView::new(self.name.as_str(), project_count)
    }
}

/// A grouping of documents within a namespace.
///
/// Keyed by the composite `(namespace, id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Owning namespace.
    pub namespace: NamespaceName,
    /// Project id, unique within `namespace`.
    pub id: ProjectId,
    /// When the project was created.
    pub created_at: DateTime<Utc>,
}

impl Project {
    /// Create a project record stamped with the current time.
    pub fn new(namespace: NamespaceName, id: ProjectId) -> Self {
        Self {
            namespace,
            id,
            created_at: Utc::now(),
        }
    }

    /// Canonical JSON view, given the number of linked documents.
    pub fn view(&self, document_count: u64) -> ProjectView {
        ProjectView::new(self.id.as_str(), document_count)
    }
}

/// Metadata record for one stored blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Surrogate key.
    pub id: DocumentId,
    /// Content digest; dedup key and storage key.
    pub md5: ContentDigest,
    /// Where the bytes live in the object store.
    pub url: String,
    /// Human-readable name from the first upload of this content.
    pub name: String,
    /// Size in whole kilobytes (`bytes / 1024`).
    pub size_in_kb: u64,
    /// Extension of `name`, without the dot.
    pub filetype: String,
    /// When the document was catalogued.
    pub created_at: DateTime<Utc>,
}

impl Document {
    /// Build a new document record, deriving size and file type.
    pub fn new(md5: ContentDigest, url: String, name: impl Into<String>, byte_len: u64) -> Self {
        let name = name.into();
        Self {
            id: DocumentId::new(),
            md5,
            url,
            filetype: file_type_of(&name),
            name,
            size_in_kb: size_in_kb(byte_len),
            created_at: Utc::now(),
        }
    }

    /// Object-store key for this document's bytes.
    pub fn storage_key(&self) -> String {
        self.md5.to_hex()
    }

    /// Canonical JSON view.
    pub fn view(&self) -> DocumentView {
        DocumentView::from(self)
    }
}

/// "Document D is filed under project P."
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Generated identifier.
    pub id: LinkId,
    /// Namespace of the linked project.
    pub namespace: NamespaceName,
    /// The linked project.
    pub project_id: ProjectId,
    /// The linked document.
    pub document_id: DocumentId,
    /// When the link was created.
    pub created_at: DateTime<Utc>,
}

impl Link {
    /// Create a link between `project` and the document `document_id`.
    pub fn new(project: &Project, document_id: DocumentId) -> Self {
        Self {
            id: LinkId::new(),
            namespace: project.namespace.clone(),
            project_id: project.id.clone(),
            document_id,
            created_at: Utc::now(),
        }
    }

    /// Whether this link files its document under `project`.
    pub fn belongs_to(&self, project: &Project) -> bool {
        self.namespace == project.namespace && self.project_id == project.id
    }
}

/// Whole kilobytes in `byte_len` (integer division, so sizes floor).
pub fn size_in_kb(byte_len: u64) -> u64 {
    byte_len / 1024
}

/// File type derived from a display name: the text after the last `.` of
/// the final path segment.
///
/// Names with no dot, or whose only dot is the leading one (`.bashrc`),
/// have an empty file type. Case is preserved.
pub fn file_type_of(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    match base.rfind('.') {
        Some(0) | None => String::new(),
        Some(idx) => base[idx + 1..].to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::md5_digest;
    use proptest::prelude::*;

    fn project(ns: &str, id: &str) -> Project {
        Project::new(NamespaceName::new(ns).unwrap(), ProjectId::new(id).unwrap())
    }

    #[test]
    fn file_type_simple_extension() {
        assert_eq!(file_type_of("report.pdf"), "pdf");
        assert_eq!(file_type_of("a.txt"), "txt");
    }

    #[test]
    fn file_type_uses_last_extension() {
        assert_eq!(file_type_of("archive.tar.gz"), "gz");
    }

    #[test]
    fn file_type_empty_when_no_extension() {
        assert_eq!(file_type_of("README"), "");
        assert_eq!(file_type_of(".bashrc"), "");
        assert_eq!(file_type_of("trailing."), "");
    }

    #[test]
    fn file_type_ignores_directory_dots() {
        assert_eq!(file_type_of("some.dir/notes"), "");
        assert_eq!(file_type_of("C:\\upload.d\\scan.PNG"), "PNG");
    }

    #[test]
    fn size_in_kb_floors() {
        assert_eq!(size_in_kb(0), 0);
        assert_eq!(size_in_kb(500), 0);
        assert_eq!(size_in_kb(2048), 2);
        assert_eq!(size_in_kb(3071), 2);
    }

    #[test]
    fn document_new_derives_fields() {
        let digest = md5_digest(b"hello");
        let doc = Document::new(digest, "https://x/y".into(), "a.txt", 2048);
        assert_eq!(doc.size_in_kb, 2);
        assert_eq!(doc.filetype, "txt");
        assert_eq!(doc.storage_key(), digest.to_hex());
        assert_eq!(doc.name, "a.txt");
    }

    #[test]
    fn link_belongs_to_its_project_only() {
        let p1 = project("wb", "p1");
        let p1_other_ns = project("other", "p1");
        let link = Link::new(&p1, DocumentId::new());
        assert!(link.belongs_to(&p1));
        assert!(!link.belongs_to(&p1_other_ns));
    }

    proptest! {
        #[test]
        fn size_never_exceeds_bytes(len in 0u64..u64::MAX) {
            prop_assert!(size_in_kb(len) * 1024 <= len);
        }

        #[test]
        fn file_type_has_no_dot_or_separator(name in "[a-zA-Z0-9./\\\\]{0,40}") {
            let ft = file_type_of(&name);
            prop_assert!(!ft.contains('.'));
            prop_assert!(!ft.contains('/'));
            prop_assert!(!ft.contains('\\'));
        }
    }
}
