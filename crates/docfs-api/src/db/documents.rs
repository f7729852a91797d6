//! Document persistence operations.
//!
//! All functions take a `&PgPool` and operate on the `documents` table.
//! `md5` carries a UNIQUE constraint, so two racing inserts of the same
//! content leave exactly one row; the loser sees a unique violation.

use chrono::{DateTime, Utc};
use docfs_core::{ContentDigest, Document, DocumentId, NamespaceName, ProjectId};
use sqlx::PgPool;
use uuid::Uuid;

use super::decode_error;

const COLUMNS: &str = "id, md5, url, name, size_in_kb, filetype, created_at";

/// Insert a new document.
pub async fn insert(pool: &PgPool, document: &Document) -> Result<(), sqlx::Error> {
    let size_in_kb = i64::try_from(document.size_in_kb)
        .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

    sqlx::query(
        "INSERT INTO documents (id, md5, url, name, size_in_kb, filetype, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(document.id.as_uuid())
    .bind(document.md5.to_hex())
    .bind(&document.url)
    .bind(&document.name)
    .bind(size_in_kb)
    .bind(&document.filetype)
    .bind(document.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Fetch a document by surrogate id.
pub async fn get_by_id(pool: &PgPool, id: DocumentId) -> Result<Option<Document>, sqlx::Error> {
    let row = sqlx::query_as::<_, DocumentRow>(&format!(
        "SELECT {COLUMNS} FROM documents WHERE id = $1"
    ))
    .bind(id.as_uuid())
    .fetch_optional(pool)
    .await?;

    row.map(DocumentRow::into_record).transpose()
}

/// Fetch the document holding `digest`, if any.
pub async fn get_by_digest(
    pool: &PgPool,
    digest: &ContentDigest,
) -> Result<Option<Document>, sqlx::Error> {
    let row = sqlx::query_as::<_, DocumentRow>(&format!(
        "SELECT {COLUMNS} FROM documents WHERE md5 = $1"
    ))
    .bind(digest.to_hex())
    .fetch_optional(pool)
    .await?;

    row.map(DocumentRow::into_record).transpose()
}

/// List every document in creation order.
pub async fn list(pool: &PgPool) -> Result<Vec<Document>, sqlx::Error> {
    let rows = sqlx::query_as::<_, DocumentRow>(&format!(
        "SELECT {COLUMNS} FROM documents ORDER BY created_at, id"
    ))
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(DocumentRow::into_record).collect()
}

/// Documents linked under a project, in link order.
pub async fn list_for_project(
    pool: &PgPool,
    namespace: &NamespaceName,
    project: &ProjectId,
) -> Result<Vec<Document>, sqlx::Error> {
    let rows = sqlx::query_as::<_, DocumentRow>(
        "SELECT d.id, d.md5, d.url, d.name, d.size_in_kb, d.filetype, d.created_at
         FROM links l JOIN documents d ON d.id = l.document_id
         WHERE l.namespace_name = $1 AND l.project_id = $2
         ORDER BY l.created_at, l.id",
    )
    .bind(namespace.as_str())
    .bind(project.as_str())
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(DocumentRow::into_record).collect()
}

#[derive(sqlx::FromRow)]
struct DocumentRow {
    id: Uuid,
    md5: String,
    url: String,
    name: String,
    size_in_kb: i64,
    filetype: String,
    created_at: DateTime<Utc>,
}

impl DocumentRow {
    fn into_record(self) -> Result<Document, sqlx::Error> {
        Ok(Document {
            id: DocumentId::from_uuid(self.id),
            md5: ContentDigest::from_hex(self.md5.trim()).map_err(decode_error)?,
            url: self.url,
            name: self.name,
            size_in_kb: u64::try_from(self.size_in_kb).map_err(decode_error)?,
            filetype: self.filetype,
            created_at: self.created_at,
        })
    }
}
