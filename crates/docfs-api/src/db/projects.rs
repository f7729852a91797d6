//! Project persistence operations.
//!
//! All functions take a `&PgPool` and operate on the `projects` table,
//! keyed by `(namespace_name, id)`. The owning namespace must exist; a
//! missing one surfaces as a foreign-key violation on insert.

use chrono::{DateTime, Utc};
use docfs_core::{NamespaceName, Project, ProjectId};
use sqlx::PgPool;

use super::{count_to_u64, decode_error};

/// Insert a new project.
pub async fn insert(pool: &PgPool, project: &Project) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO projects (namespace_name, id, created_at) VALUES ($1, $2, $3)")
        .bind(project.namespace.as_str())
        .bind(project.id.as_str())
        .bind(project.created_at)
        .execute(pool)
        .await?;

    Ok(())
}

/// Fetch a project by its composite key.
pub async fn get(
    pool: &PgPool,
    namespace: &NamespaceName,
    id: &ProjectId,
) -> Result<Option<Project>, sqlx::Error> {
    let row = sqlx::query_as::<_, ProjectRow>(
        "SELECT namespace_name, id, created_at FROM projects
         WHERE namespace_name = $1 AND id = $2",
    )
    .bind(namespace.as_str())
    .bind(id.as_str())
    .fetch_optional(pool)
    .await?;

    row.map(ProjectRow::into_record).transpose()
}

/// List the projects of a namespace ordered by id.
pub async fn list(pool: &PgPool, namespace: &NamespaceName) -> Result<Vec<Project>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ProjectRow>(
        "SELECT namespace_name, id, created_at FROM projects
         WHERE namespace_name = $1 ORDER BY id",
    )
    .bind(namespace.as_str())
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(ProjectRow::into_record).collect()
}

/// Number of projects owned by a namespace.
pub async fn count_in_namespace(
    pool: &PgPool,
    namespace: &NamespaceName,
) -> Result<u64, sqlx::Error> {
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM projects WHERE namespace_name = $1")
            .bind(namespace.as_str())
            .fetch_one(pool)
            .await?;

    count_to_u64(count)
}

/// Delete a project and its links. Documents stay.
///
/// Returns `false` if the project did not exist.
pub async fn delete_cascade(
    pool: &PgPool,
    namespace: &NamespaceName,
    id: &ProjectId,
) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let links = sqlx::query("DELETE FROM links WHERE namespace_name = $1 AND project_id = $2")
        .bind(namespace.as_str())
        .bind(id.as_str())
        .execute(&mut *tx)
        .await?;
    let result = sqlx::query("DELETE FROM projects WHERE namespace_name = $1 AND id = $2")
        .bind(namespace.as_str())
        .bind(id.as_str())
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        tx.rollback().await?;
        return Ok(false);
    }

    tx.commit().await?;
    tracing::debug!(
        namespace = %namespace,
        project = %id,
        links = links.rows_affected(),
        "project cascade committed"
    );
    Ok(true)
}

#[derive(sqlx::FromRow)]
struct ProjectRow {
    namespace_name: String,
    id: String,
    created_at: DateTime<Utc>,
}

impl ProjectRow {
    fn into_record(self) -> Result<Project, sqlx::Error> {
        Ok(Project {
            namespace: NamespaceName::new(&self.namespace_name).map_err(decode_error)?,
            id: ProjectId::new(&self.id).map_err(decode_error)?,
            created_at: self.created_at,
        })
    }
}
