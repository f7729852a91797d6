//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor.
//!
//! The [`Catalog`] owns the metadata store and the blob store. Which
//! implementations back it is decided once, from [`AppConfig`]:
//!
//! - metadata: Postgres when `DATABASE_URL` is set, otherwise in memory
//! - blobs: S3, a local directory, or memory per `DOCFS_BLOB_BACKEND`

use std::sync::Arc;

use docfs_blob::{BlobStore, FsBlobStore, MemoryBlobStore, S3BlobStore};
use docfs_catalog::{Catalog, CatalogSettings, MemoryMetadataStore, MetadataStore};
use sqlx::PgPool;

use crate::config::{AppConfig, BlobBackend};
use crate::db::PgMetadataStore;

/// Shared application state accessible to all route handlers.
///
/// Clone-friendly: the catalog and the pool are `Arc`-backed.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Catalog service over the configured stores.
    pub catalog: Catalog,
    /// PostgreSQL connection pool, when metadata is persisted.
    pub db_pool: Option<PgPool>,
    /// Configuration the state was built from.
    pub config: AppConfig,
}

impl AppState {
    /// In-memory state with default configuration (auth disabled).
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    /// In-memory state with the given configuration.
    ///
    /// The configured blob backend and database are ignored; use
    /// [`AppState::connect`] to honor them.
    pub fn with_config(config: AppConfig) -> Self {
        Self::with_stores(
            config,
            Arc::new(MemoryMetadataStore::new()),
            Arc::new(MemoryBlobStore::new()),
        )
    }

    /// State over explicit stores.
    pub fn with_stores(
        config: AppConfig,
        metadata: Arc<dyn MetadataStore>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        let catalog = Catalog::new(metadata, blobs, catalog_settings(&config));
        Self {
            catalog,
            db_pool: None,
            config,
        }
    }

    /// Build state from `config`, connecting to Postgres and the blob
    /// backend it names.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `DATABASE_URL` is set but the connection or
    /// migrations fail.
    pub async fn connect(config: AppConfig) -> Result<Self, sqlx::Error> {
        let db_pool = crate::db::init_pool(config.database_url.as_deref().map(String::as_str)).await?;

        let metadata: Arc<dyn MetadataStore> = match &db_pool {
            Some(pool) => Arc::new(PgMetadataStore::new(pool.clone())),
            None => Arc::new(MemoryMetadataStore::new()),
        };

        let blobs: Arc<dyn BlobStore> = match &config.blob_backend {
            BlobBackend::Memory => {
                tracing::warn!("using in-memory blob storage, documents will not survive restarts");
                Arc::new(MemoryBlobStore::new())
            }
            BlobBackend::Filesystem {
                root,
                public_base_url,
            } => {
                tracing::info!(root = %root.display(), "using filesystem blob storage");
                Arc::new(FsBlobStore::new(root.clone(), public_base_url.clone()))
            }
            BlobBackend::S3(settings) => Arc::new(S3BlobStore::connect(settings.clone()).await),
        };

        let catalog = Catalog::new(metadata, blobs, catalog_settings(&config));
        Ok(Self {
            catalog,
            db_pool,
            config,
        })
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

fn catalog_settings(config: &AppConfig) -> CatalogSettings {
    CatalogSettings {
        max_upload_bytes: config.max_upload_bytes,
    }
}
