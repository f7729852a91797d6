//! Filesystem blob store.
//!
//! Objects are flat files named by key under a root directory. Writes go to
//! a temporary sibling first and are renamed into place, so a reader never
//! observes a partially written object.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::{key_from_url, validate_key, BlobError, BlobStore};

// Concurrent writers of the same key each get their own temp file.
static TMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// [`BlobStore`] backed by a local directory.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
    public_base_url: String,
}

impl FsBlobStore {
    /// Create a store rooted at `root`, handing out URLs under `public_base_url`.
    ///
    /// The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> BlobError + '_ {
        move |source| BlobError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

#[cfg(unix)]
async fn make_world_readable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, std::fs::Permissions::from_mode(0o644)).await
}

#[cfg(not(unix))]
async fn make_world_readable(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

async fn write_then_rename(
    tmp_path: &Path,
    final_path: &Path,
    data: &[u8],
) -> Result<(), BlobError> {
    let mut file = fs::File::create(tmp_path)
        .await
        .map_err(FsBlobStore::io_err(tmp_path))?;
    file.write_all(data).await.map_err(FsBlobStore::io_err(tmp_path))?;
    file.sync_all().await.map_err(FsBlobStore::io_err(tmp_path))?;
    drop(file);

    make_world_readable(tmp_path)
        .await
        .map_err(FsBlobStore::io_err(tmp_path))?;
    fs::rename(tmp_path, final_path)
        .await
        .map_err(FsBlobStore::io_err(final_path))
}

#[async_trait]
impl BlobStore for FsBlobStore {
    fn url_for(&self, key: &str) -> String {
        format!("{}/{key}", self.public_base_url)
    }

    async fn put(&self, key: &str, data: &[u8]) -> Result<String, BlobError> {
        validate_key(key)?;
        fs::create_dir_all(&self.root)
            .await
            .map_err(Self::io_err(&self.root))?;

        let final_path = self.root.join(key);
        let seq = TMP_SEQ.fetch_add(1, Ordering::Relaxed);
        let tmp_path = self
            .root
            .join(format!(".{key}.{}.{seq}.tmp", std::process::id()));

        if let Err(err) = write_then_rename(&tmp_path, &final_path, data).await {
            if let Err(cleanup) = fs::remove_file(&tmp_path).await {
                if cleanup.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(
                        path = %tmp_path.display(),
                        error = %cleanup,
                        "failed to remove temporary blob file"
                    );
                }
            }
            return Err(err);
        }

        tracing::debug!(key, size = data.len(), path = %final_path.display(), "blob written");
        Ok(self.url_for(key))
    }

    async fn get(&self, url: &str) -> Result<Vec<u8>, BlobError> {
        let key = key_from_url(&self.public_base_url, url)?;
        let path = self.root.join(key);
        match fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(BlobError::NotFound {
                key: key.to_string(),
            }),
            Err(source) => Err(BlobError::Io {
                path: path.display().to_string(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_writes_file_under_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path().join("blobs"), "http://localhost:8080/blobs/");
        let url = store.put("abc", b"payload").await.unwrap();

        assert_eq!(url, "http://localhost:8080/blobs/abc");
        let on_disk = std::fs::read(dir.path().join("blobs").join("abc")).unwrap();
        assert_eq!(on_disk, b"payload");
    }

    #[tokio::test]
    async fn get_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path(), "file:///blobs");
        let url = store.put("k1", &[0u8, 1, 2, 255]).await.unwrap();
        assert_eq!(store.get(&url).await.unwrap(), vec![0u8, 1, 2, 255]);
    }

    #[tokio::test]
    async fn failed_rename_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path(), "file:///blobs");
        std::fs::create_dir_all(dir.path().join("k").join("occupied")).unwrap();

        let err = store.put("k", b"data").await.unwrap_err();
        assert!(matches!(err, BlobError::Io { .. }));

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["k".to_string()]);
    }

    #[tokio::test]
    async fn overwrite_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path(), "file:///blobs");
        store.put("k", b"same").await.unwrap();
        store.put("k", b"same").await.unwrap();
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn missing_object_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path(), "file:///blobs");
        let err = store.get("file:///blobs/absent").await.unwrap_err();
        assert!(matches!(err, BlobError::NotFound { .. }));
    }

    #[tokio::test]
    async fn traversal_key_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path(), "file:///blobs");
        assert!(matches!(
            store.put("../escape", b"x").await,
            Err(BlobError::InvalidKey(_))
        ));
        assert!(matches!(
            store.get("file:///blobs/../escape").await,
            Err(BlobError::ForeignUrl(_))
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn written_objects_are_world_readable() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path(), "file:///blobs");
        store.put("pub", b"x").await.unwrap();
        let mode = std::fs::metadata(dir.path().join("pub"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o644);
    }
}
