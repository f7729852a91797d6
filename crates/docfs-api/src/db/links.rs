//! Link persistence operations.
//!
//! All functions take a `&PgPool` and operate on the `links` table. At most
//! one link exists per `(namespace_name, project_id, document_id)`.

use chrono::{DateTime, Utc};
use docfs_core::{DocumentId, Link, LinkId, NamespaceName, ProjectId};
use sqlx::PgPool;
use uuid::Uuid;

use super::{count_to_u64, decode_error};

/// Insert a new link.
pub async fn insert(pool: &PgPool, link: &Link) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO links (id, namespace_name, project_id, document_id, created_at)
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(link.id.as_uuid())
    .bind(link.namespace.as_str())
    .bind(link.project_id.as_str())
    .bind(link.document_id.as_uuid())
    .bind(link.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// The link filing `document` under the given project, if any.
pub async fn find(
    pool: &PgPool,
    namespace: &NamespaceName,
    project: &ProjectId,
    document: DocumentId,
) -> Result<Option<Link>, sqlx::Error> {
    let row = sqlx::query_as::<_, LinkRow>(
        "SELECT id, namespace_name, project_id, document_id, created_at FROM links
         WHERE namespace_name = $1 AND project_id = $2 AND document_id = $3",
    )
    .bind(namespace.as_str())
    .bind(project.as_str())
    .bind(document.as_uuid())
    .fetch_optional(pool)
    .await?;

    row.map(LinkRow::into_record).transpose()
}

/// Number of documents linked under a project.
pub async fn count_for_project(
    pool: &PgPool,
    namespace: &NamespaceName,
    project: &ProjectId,
) -> Result<u64, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM links WHERE namespace_name = $1 AND project_id = $2",
    )
    .bind(namespace.as_str())
    .bind(project.as_str())
    .fetch_one(pool)
    .await?;

    count_to_u64(count)
}

/// Delete one link. Returns `false` if it did not exist.
pub async fn delete(pool: &PgPool, id: LinkId) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM links WHERE id = $1")
        .bind(id.as_uuid())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// List every link in creation order.
pub async fn list(pool: &PgPool) -> Result<Vec<Link>, sqlx::Error> {
    let rows = sqlx::query_as::<_, LinkRow>(
        "SELECT id, namespace_name, project_id, document_id, created_at FROM links
         ORDER BY created_at, id",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(LinkRow::into_record).collect()
}

#[derive(sqlx::FromRow)]
struct LinkRow {
    id: Uuid,
    namespace_name: String,
    project_id: String,
    document_id: Uuid,
    created_at: DateTime<Utc>,
}

impl LinkRow {
    fn into_record(self) -> Result<Link, sqlx::Error> {
        Ok(Link {
            id: LinkId::from_uuid(self.id),
            namespace: NamespaceName::new(&self.namespace_name).map_err(decode_error)?,
            project_id: ProjectId::new(&self.project_id).map_err(decode_error)?,
            document_id: DocumentId::from_uuid(self.document_id),
            created_at: self.created_at,
        })
    }
}
