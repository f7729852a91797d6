//! Namespace persistence operations.
//!
//! All functions take a `&PgPool` and operate on the `namespaces` table.
//! Deleting a namespace removes its projects and their links in the same
//! transaction; documents are never touched.

use chrono::{DateTime, Utc};
use docfs_core::{Namespace, NamespaceName};
use sqlx::PgPool;

use super::decode_error;

/// Insert a new namespace. A duplicate name is a unique violation.
pub async fn insert(pool: &PgPool, namespace: &Namespace) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO namespaces (name, created_at) VALUES ($1, $2)")
        .bind(namespace.name.as_str())
        .bind(namespace.created_at)
        .execute(pool)
        .await?;

    Ok(())
}

/// Fetch a namespace by name.
pub async fn get(pool: &PgPool, name: &NamespaceName) -> Result<Option<Namespace>, sqlx::Error> {
    let row = sqlx::query_as::<_, NamespaceRow>(
        "SELECT name, created_at FROM namespaces WHERE name = $1",
    )
    .bind(name.as_str())
    .fetch_optional(pool)
    .await?;

    row.map(NamespaceRow::into_record).transpose()
}

/// List all namespaces ordered by name.
pub async fn list(pool: &PgPool) -> Result<Vec<Namespace>, sqlx::Error> {
    let rows = sqlx::query_as::<_, NamespaceRow>(
        "SELECT name, created_at FROM namespaces ORDER BY name",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(NamespaceRow::into_record).collect()
}

/// Delete a namespace with its projects and links.
///
/// Returns `false` if the namespace did not exist. Either every row goes
/// or none does.
pub async fn delete_cascade(pool: &PgPool, name: &NamespaceName) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let links = sqlx::query("DELETE FROM links WHERE namespace_name = $1")
        .bind(name.as_str())
        .execute(&mut *tx)
        .await?;
    let projects = sqlx::query("DELETE FROM projects WHERE namespace_name = $1")
        .bind(name.as_str())
        .execute(&mut *tx)
        .await?;
    let result = sqlx::query("DELETE FROM namespaces WHERE name = $1")
        .bind(name.as_str())
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        tx.rollback().await?;
        return Ok(false);
    }

    tx.commit().await?;
    tracing::debug!(
        namespace = %name,
        projects = projects.rows_affected(),
        links = links.rows_affected(),
        "namespace cascade committed"
    );
    Ok(true)
}

#[derive(sqlx::FromRow)]
struct NamespaceRow {
    name: String,
    created_at: DateTime<Utc>,
}

impl NamespaceRow {
    fn into_record(self) -> Result<Namespace, sqlx::Error> {
        Ok(Namespace {
            name: NamespaceName::new(&self.name).map_err(decode_error)?,
            created_at: self.created_at,
        })
    }
}
