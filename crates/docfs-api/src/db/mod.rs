//! # Database Persistence Layer
//!
//! Postgres persistence for catalog metadata via SQLx.
//!
//! The database layer is **optional**. When `DATABASE_URL` is set, the
//! catalog's [`MetadataStore`] is [`PgMetadataStore`]. When absent, the API
//! keeps metadata in memory (suitable for development and testing).
//!
//! Table operations are free functions over a `&PgPool`, one module per
//! table, returning `sqlx::Error`. [`PgMetadataStore`] adapts them to the
//! store contract and maps constraint violations by SQLSTATE:
//!
//! | SQLSTATE | Meaning | [`StoreError`] |
//! |----------|---------|----------------|
//! | `23505` | unique violation | `Conflict` |
//! | `23503` | foreign-key violation | `MissingParent` |
//! | other | | `Backend` |

pub mod documents;
pub mod links;
pub mod namespaces;
pub mod projects;

use async_trait::async_trait;
use docfs_catalog::{MetadataStore, StoreError};
use docfs_core::{
    ContentDigest, Document, DocumentId, Link, LinkId, Namespace, NamespaceName, Project,
    ProjectId,
};
use sqlx::postgres::{PgPool, PgPoolOptions};

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Initialize the database connection pool and run migrations.
///
/// Returns `None` if no URL is given (in-memory-only mode).
/// Returns `Err` if the URL is set but the connection or migration fails.
pub async fn init_pool(database_url: Option<&str>) -> Result<Option<PgPool>, sqlx::Error> {
    let Some(url) = database_url else {
        tracing::warn!(
            "DATABASE_URL not set, running in-memory only mode. \
             Catalog metadata will not survive restarts."
        );
        return Ok(None);
    };

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .min_connections(2)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(url)
        .await?;

    tracing::info!("Connected to PostgreSQL");

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(Some(pool))
}

/// Classify a database failure by SQLSTATE.
fn classify(code: Option<&str>, message: String) -> StoreError {
    match code {
        Some(UNIQUE_VIOLATION) => StoreError::Conflict(message),
        Some(FOREIGN_KEY_VIOLATION) => StoreError::MissingParent(message),
        _ => StoreError::Backend(message),
    }
}

/// Map a `sqlx::Error` onto the store error taxonomy.
pub fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    match err.as_database_error() {
        Some(db_err) => {
            let code = db_err.code();
            classify(code.as_deref(), db_err.message().to_string())
        }
        None => StoreError::Backend(err.to_string()),
    }
}

/// Wrap a row-conversion failure as a decode error.
pub(crate) fn decode_error<E>(err: E) -> sqlx::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    sqlx::Error::Decode(Box::new(err))
}

/// Convert a `COUNT(*)` result, rejecting a negative count as a decode error.
pub(crate) fn count_to_u64(count: i64) -> Result<u64, sqlx::Error> {
    u64::try_from(count).map_err(decode_error)
}

/// [`MetadataStore`] backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgMetadataStore {
    pool: PgPool,
}

impl PgMetadataStore {
    /// Wrap a connected, migrated pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MetadataStore for PgMetadataStore {
    async fn insert_namespace(&self, namespace: &Namespace) -> Result<(), StoreError> {
        namespaces::insert(&self.pool, namespace)
            .await
            .map_err(map_sqlx_error)
    }

    async fn get_namespace(&self, name: &NamespaceName) -> Result<Option<Namespace>, StoreError> {
        namespaces::get(&self.pool, name)
            .await
            .map_err(map_sqlx_error)
    }

    async fn list_namespaces(&self) -> Result<Vec<Namespace>, StoreError> {
        namespaces::list(&self.pool).await.map_err(map_sqlx_error)
    }

    async fn count_projects(&self, name: &NamespaceName) -> Result<u64, StoreError> {
        projects::count_in_namespace(&self.pool, name)
            .await
            .map_err(map_sqlx_error)
    }

    async fn delete_namespace(&self, name: &NamespaceName) -> Result<bool, StoreError> {
        namespaces::delete_cascade(&self.pool, name)
            .await
            .map_err(map_sqlx_error)
    }

    async fn insert_project(&self, project: &Project) -> Result<(), StoreError> {
        projects::insert(&self.pool, project)
            .await
            .map_err(map_sqlx_error)
    }

    async fn get_project(
        &self,
        namespace: &NamespaceName,
        id: &ProjectId,
    ) -> Result<Option<Project>, StoreError> {
        projects::get(&self.pool, namespace, id)
            .await
            .map_err(map_sqlx_error)
    }

    async fn list_projects(&self, namespace: &NamespaceName) -> Result<Vec<Project>, StoreError> {
        projects::list(&self.pool, namespace)
            .await
            .map_err(map_sqlx_error)
    }

    async fn count_documents(
        &self,
        namespace: &NamespaceName,
        id: &ProjectId,
    ) -> Result<u64, StoreError> {
        links::count_for_project(&self.pool, namespace, id)
            .await
            .map_err(map_sqlx_error)
    }

    async fn list_project_documents(
        &self,
        namespace: &NamespaceName,
        id: &ProjectId,
    ) -> Result<Vec<Document>, StoreError> {
        documents::list_for_project(&self.pool, namespace, id)
            .await
            .map_err(map_sqlx_error)
    }

    async fn delete_project(
        &self,
        namespace: &NamespaceName,
        id: &ProjectId,
    ) -> Result<bool, StoreError> {
        projects::delete_cascade(&self.pool, namespace, id)
            .await
            .map_err(map_sqlx_error)
    }

    async fn insert_document(&self, document: &Document) -> Result<(), StoreError> {
        documents::insert(&self.pool, document)
            .await
            .map_err(map_sqlx_error)
    }

    async fn get_document(&self, id: DocumentId) -> Result<Option<Document>, StoreError> {
        documents::get_by_id(&self.pool, id)
            .await
            .map_err(map_sqlx_error)
    }

    async fn find_document_by_digest(
        &self,
        digest: &ContentDigest,
    ) -> Result<Option<Document>, StoreError> {
        documents::get_by_digest(&self.pool, digest)
            .await
            .map_err(map_sqlx_error)
    }

    async fn list_documents(&self) -> Result<Vec<Document>, StoreError> {
        documents::list(&self.pool).await.map_err(map_sqlx_error)
    }

    async fn insert_link(&self, link: &Link) -> Result<(), StoreError> {
        links::insert(&self.pool, link).await.map_err(map_sqlx_error)
    }

    async fn find_link(
        &self,
        namespace: &NamespaceName,
        project: &ProjectId,
        document: DocumentId,
    ) -> Result<Option<Link>, StoreError> {
        links::find(&self.pool, namespace, project, document)
            .await
            .map_err(map_sqlx_error)
    }

    async fn delete_link(&self, id: LinkId) -> Result<bool, StoreError> {
        links::delete(&self.pool, id).await.map_err(map_sqlx_error)
    }

    async fn list_links(&self) -> Result<Vec<Link>, StoreError> {
        links::list(&self.pool).await.map_err(map_sqlx_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_violation_is_conflict() {
        let err = classify(Some("23505"), "duplicate key value".into());
        assert_eq!(err, StoreError::Conflict("duplicate key value".into()));
    }

    #[test]
    fn foreign_key_violation_is_missing_parent() {
        let err = classify(Some("23503"), "violates foreign key".into());
        assert!(matches!(err, StoreError::MissingParent(_)));
    }

    #[test]
    fn other_codes_are_backend() {
        assert!(matches!(
            classify(Some("40001"), "serialization failure".into()),
            StoreError::Backend(_)
        ));
        assert!(matches!(classify(None, "x".into()), StoreError::Backend(_)));
    }

    #[test]
    fn non_database_errors_are_backend() {
        assert!(matches!(
            map_sqlx_error(sqlx::Error::PoolTimedOut),
            StoreError::Backend(_)
        ));
        assert!(matches!(
            map_sqlx_error(sqlx::Error::RowNotFound),
            StoreError::Backend(_)
        ));
    }

    #[test]
    fn counts_convert_or_fail_to_decode() {
        assert_eq!(count_to_u64(0).unwrap(), 0);
        assert_eq!(count_to_u64(42).unwrap(), 42);
        assert!(matches!(count_to_u64(-1), Err(sqlx::Error::Decode(_))));
    }

    #[tokio::test]
    async fn init_pool_without_url_is_none() {
        assert!(init_pool(None).await.unwrap().is_none());
    }
}
