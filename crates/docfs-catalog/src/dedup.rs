//! # Deduplication Engine
//!
//! Content is stored once per MD5 digest. [`Deduplicator::find_or_store`]
//! hashes the full payload, returns the existing [`Document`] when the digest
//! is already catalogued, and otherwise writes the bytes under the digest key
//! and inserts a new Document.
//!
//! ## Concurrent identical uploads
//!
//! Lookup and insert are two steps, so two uploads of the same bytes can both
//! miss the lookup. Both blob writes land on the same key with the same bytes.
//! The metadata store rejects the second insert with a conflict, and the
//! loser re-fetches the winner's Document. Callers always see one Document
//! per digest.

use std::sync::Arc;

use docfs_blob::BlobStore;
use docfs_core::{ContentDigest, Document};

use crate::error::{CatalogError, StoreError};
use crate::store::MetadataStore;

/// Finds or stores documents by content digest.
#[derive(Debug, Clone)]
pub struct Deduplicator {
    metadata: Arc<dyn MetadataStore>,
    blobs: Arc<dyn BlobStore>,
}

impl Deduplicator {
    /// Create an engine over the given stores.
    pub fn new(metadata: Arc<dyn MetadataStore>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { metadata, blobs }
    }

    /// Return the Document for `bytes`, storing it first if it is new.
    ///
    /// `display_name` only applies to a newly created Document; an existing
    /// Document keeps the name of its first upload.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::Storage`] if the blob write fails. No metadata is written.
    /// - [`CatalogError::NotSaved`] if the blob was written but the Document
    ///   row could not be inserted. The orphaned key is logged.
    /// - [`CatalogError::Metadata`] if the digest lookup itself fails.
    pub async fn find_or_store(
        &self,
        bytes: &[u8],
        display_name: &str,
    ) -> Result<Document, CatalogError> {
        let digest = ContentDigest::of(bytes);

        if let Some(existing) = self.metadata.find_document_by_digest(&digest).await? {
            tracing::debug!(%digest, document_id = %existing.id, "reusing stored document");
            return Ok(existing);
        }

        let key = digest.to_hex();
        let url = self.blobs.put(&key, bytes).await.map_err(|err| {
            tracing::error!(%digest, error = %err, "blob write failed");
            CatalogError::Storage(err)
        })?;

        let document = Document::new(digest, url, display_name, bytes.len() as u64);
        match self.metadata.insert_document(&document).await {
            Ok(()) => {
                tracing::info!(
                    %digest,
                    document_id = %document.id,
                    name = %document.name,
                    size_in_kb = document.size_in_kb,
                    "stored new document"
                );
                Ok(document)
            }
            Err(StoreError::Conflict(_)) => {
                match self.metadata.find_document_by_digest(&digest).await? {
                    Some(winner) => {
                        tracing::debug!(%digest, document_id = %winner.id, "lost insert race, reusing document");
                        Ok(winner)
                    }
                    None => Err(CatalogError::NotSaved(format!(
                        "document with digest {digest} conflicted but could not be re-read"
                    ))),
                }
            }
            Err(err) => {
                tracing::warn!(
                    %digest,
                    orphaned_key = %key,
                    error = %err,
                    "blob stored but document row was not saved"
                );
                Err(CatalogError::NotSaved(format!(
                    "document with digest {digest} was not saved"
                )))
            }
        }
    }
}
