//! In-memory blob store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::{key_from_url, validate_key, BlobError, BlobStore};

const BASE_URL: &str = "memory://docfs";

#[derive(Debug, Clone)]
struct StoredObject {
    data: Vec<u8>,
    public_read: bool,
}

/// Thread-safe, cloneable in-memory [`BlobStore`].
///
/// Clones share the same objects. Keeps a count of `put` calls so tests can
/// assert that an operation did not touch storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    objects: Arc<RwLock<HashMap<String, StoredObject>>>,
    puts: Arc<AtomicU64>,
}

impl MemoryBlobStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `put` calls made so far, including overwrites.
    pub fn put_count(&self) -> u64 {
        self.puts.load(Ordering::Relaxed)
    }

    /// Number of distinct objects held.
    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    /// Whether no objects are held.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `key` is stored and marked public-read.
    pub fn is_public(&self, key: &str) -> bool {
        self.objects
            .read()
            .get(key)
            .map(|o| o.public_read)
            .unwrap_or(false)
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    fn url_for(&self, key: &str) -> String {
        format!("{BASE_URL}/{key}")
    }

    async fn put(&self, key: &str, data: &[u8]) -> Result<String, BlobError> {
        validate_key(key)?;
        self.puts.fetch_add(1, Ordering::Relaxed);
        self.objects.write().insert(
            key.to_string(),
            StoredObject {
                data: data.to_vec(),
                public_read: true,
            },
        );
        Ok(self.url_for(key))
    }

    async fn get(&self, url: &str) -> Result<Vec<u8>, BlobError> {
        let key = key_from_url(BASE_URL, url)?;
        self.objects
            .read()
            .get(key)
            .map(|o| o.data.clone())
            .ok_or_else(|| BlobError::NotFound {
                key: key.to_string(),
            })
    }
}
