//! # JSON Views
//!
//! The closed set of JSON shapes the API returns. Every entity type has
//! exactly one view struct; [`View`] is the sum of them, and [`Located`] is
//! the envelope used by collection listings:
//!
//! ```json
//! { "location": "root", "contents": [ { "type": "namespace", ... } ] }
//! ```
//!
//! A Link's default view is the view of the Document it points at.
//! [`LinkView`] is the expanded form used by the privileged link listing.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entity::{Document, Link};

/// View of a namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NamespaceView {
    /// Always `"namespace"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Namespace name.
    pub key: String,
    /// Namespace name.
    pub name: String,
    /// Number of projects owned by the namespace.
    pub project_count: u64,
}

impl NamespaceView {
    /// Build the view for namespace `name`.
    pub fn new(name: &str, project_count: u64) -> Self {
        Self {
            kind: "namespace".to_string(),
            key: name.to_string(),
            name: name.to_string(),
            project_count,
        }
    }
}

/// View of a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProjectView {
    /// Always `"project"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Project id.
    pub key: String,
    /// Project id.
    pub name: String,
    /// Project id.
    pub id: String,
    /// Number of documents linked to the project.
    pub document_count: u64,
}

impl ProjectView {
    /// Build the view for project `id`.
    pub fn new(id: &str, document_count: u64) -> Self {
        Self {
            kind: "project".to_string(),
            key: id.to_string(),
            name: id.to_string(),
            id: id.to_string(),
            document_count,
        }
    }
}

/// View of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DocumentView {
    /// Always `"document"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Display name.
    pub name: String,
    /// Document id.
    pub key: String,
    /// Size in whole kilobytes.
    pub size_in_kb: u64,
    /// File extension without the dot.
    pub filetype: String,
    /// Hex MD5 of the content.
    pub md5: String,
    /// Download path for the raw bytes.
    pub path: String,
}

impl From<&Document> for DocumentView {
    fn from(doc: &Document) -> Self {
        Self {
            kind: "document".to_string(),
            name: doc.name.clone(),
            key: doc.id.to_string(),
            size_in_kb: doc.size_in_kb,
            filetype: doc.filetype.clone(),
            md5: doc.md5.to_hex(),
            path: format!("/documents/{}", doc.id),
        }
    }
}

/// Expanded view of a link, for the privileged link listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LinkView {
    /// Always `"link"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Link id.
    pub key: String,
    /// Namespace of the linked project.
    pub namespace: String,
    /// Linked project id.
    pub project_id: String,
    /// Linked document id.
    pub document_id: String,
    /// The linked document.
    pub document: DocumentView,
}

impl LinkView {
    /// Build the expanded view of `link`, which must point at `document`.
    pub fn new(link: &Link, document: &Document) -> Self {
        Self {
            kind: "link".to_string(),
            key: link.id.to_string(),
            namespace: link.namespace.to_string(),
            project_id: link.project_id.to_string(),
            document_id: link.document_id.to_string(),
            document: DocumentView::from(document),
        }
    }
}

/// Any entity view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum View {
    /// A namespace.
    Namespace(NamespaceView),
    /// A project.
    Project(ProjectView),
    /// A document (also the default view of a link).
    Document(DocumentView),
    /// An expanded link.
    Link(LinkView),
}

impl From<NamespaceView> for View {
    fn from(v: NamespaceView) -> Self {
        Self::Namespace(v)
    }
}

impl From<ProjectView> for View {
    fn from(v: ProjectView) -> Self {
        Self::Project(v)
    }
}

impl From<DocumentView> for View {
    fn from(v: DocumentView) -> Self {
        Self::Document(v)
    }
}

impl From<LinkView> for View {
    fn from(v: LinkView) -> Self {
        Self::Link(v)
    }
}

/// Where a [`Located`] envelope points: a plain name or an entity view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Location {
    /// A bare location name such as `"root"` or a namespace name.
    Name(String),
    /// A full entity view.
    View(Box<View>),
}

/// Envelope for listings: a location plus an optional ordered list of children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Located {
    /// The location being listed.
    #[schema(value_type = Object)]
    pub location: Location,
    /// Child views, in listing order. Omitted when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Vec<Object>>)]
    pub contents: Option<Vec<View>>,
}

impl Located {
    /// A named location with children.
    pub fn named<V: Into<View>>(name: impl Into<String>, contents: Vec<V>) -> Self {
        Self {
            location: Location::Name(name.into()),
            contents: Some(contents.into_iter().map(Into::into).collect()),
        }
    }

    /// A location that is itself an entity view, with no children.
    pub fn at(view: impl Into<View>) -> Self {
        Self {
            location: Location::View(Box::new(view.into())),
            contents: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::md5_digest;
    use crate::entity::{Namespace, Project};
    use crate::identity::{NamespaceName, ProjectId};
    use serde_json::json;

    fn sample_document() -> Document {
        Document::new(
            md5_digest(b"abc"),
            "https://s3.amazonaws.com/docfs/900150983cd24fb0d6963f7d28e17f72".into(),
            "report.pdf",
            4096,
        )
    }

    #[test]
    fn namespace_view_shape() {
        let ns = Namespace::new(NamespaceName::new("wb").unwrap());
        let value = serde_json::to_value(ns.view(3)).unwrap();
        assert_eq!(
            value,
            json!({"type": "namespace", "key": "wb", "name": "wb", "project_count": 3})
        );
    }

    #[test]
    fn project_view_shape() {
        let p = Project::new(
            NamespaceName::new("wb").unwrap(),
            ProjectId::new("p1").unwrap(),
        );
        let value = serde_json::to_value(p.view(1)).unwrap();
        assert_eq!(
            value,
            json!({"type": "project", "key": "p1", "name": "p1", "id": "p1", "document_count": 1})
        );
    }

    #[test]
    fn document_view_shape() {
        let doc = sample_document();
        let value = serde_json::to_value(doc.view()).unwrap();
        assert_eq!(value["type"], "document");
        assert_eq!(value["name"], "report.pdf");
        assert_eq!(value["key"], doc.id.to_string());
        assert_eq!(value["size_in_kb"], 4);
        assert_eq!(value["filetype"], "pdf");
        assert_eq!(value["md5"], "900150983cd24fb0d6963f7d28e17f72");
        assert_eq!(value["path"], format!("/documents/{}", doc.id));
    }

    #[test]
    fn link_view_embeds_document() {
        let doc = sample_document();
        let project = Project::new(
            NamespaceName::new("wb").unwrap(),
            ProjectId::new("p1").unwrap(),
        );
        let link = Link::new(&project, doc.id);
        let value = serde_json::to_value(LinkView::new(&link, &doc)).unwrap();
        assert_eq!(value["type"], "link");
        assert_eq!(value["project_id"], "p1");
        assert_eq!(value["namespace"], "wb");
        assert_eq!(value["document_id"], doc.id.to_string());
        assert_eq!(value["document"]["md5"], doc.md5.to_hex());
    }

    #[test]
    fn located_named_lists_contents() {
        let located = Located::named("root", vec![NamespaceView::new("wb", 0)]);
        let value = serde_json::to_value(located).unwrap();
        assert_eq!(value["location"], "root");
        assert_eq!(value["contents"][0]["type"], "namespace");
    }

    #[test]
    fn located_named_with_no_children_keeps_empty_list() {
        let located = Located::named::<ProjectView>("wb", vec![]);
        let value = serde_json::to_value(located).unwrap();
        assert_eq!(value, json!({"location": "wb", "contents": []}));
    }

    #[test]
    fn located_at_view_omits_contents() {
        let doc = sample_document();
        let value = serde_json::to_value(Located::at(doc.view())).unwrap();
        assert_eq!(value["location"]["type"], "document");
        assert!(value.get("contents").is_none());
    }
}
