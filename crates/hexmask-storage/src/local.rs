use crate::traits::{validate_key, Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Local filesystem storage implementation
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for file storage (e.g., "/var/lib/hexmask")
    /// * `base_url` - Base URL for serving files (e.g., "http://localhost:3000/api/media/file")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Convert storage key to filesystem path with security validation
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        validate_key(storage_key)?;

        let path = self.base_path.join(storage_key);

        let base_canonical = self.base_path.canonicalize().map_err(|e| {
            StorageError::ConfigError(format!("Failed to canonicalize base path: {}", e))
        })?;

        if let Ok(canonical) = path.canonicalize() {
            if canonical.strip_prefix(&base_canonical).is_err() {
                return Err(StorageError::InvalidKey(
                    "Storage key resolves outside storage directory".to_string(),
                ));
            }
        }

        Ok(path)
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Sibling path a write is staged under before it is moved into place.
    fn staging_path(path: &Path) -> PathBuf {
        let mut name = path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(format!(".{}.partial", Uuid::new_v4().simple()));
        path.with_file_name(name)
    }

    async fn write_staged(&self, staging: &Path, data: &[u8]) -> StorageResult<()> {
        let mut file = fs::File::create(staging).await.map_err(|e| {
            StorageError::WriteFailed(format!(
                "Failed to create file {}: {}",
                staging.display(),
                e
            ))
        })?;

        file.write_all(data).await.map_err(|e| {
            StorageError::WriteFailed(format!(
                "Failed to write file {}: {}",
                staging.display(),
                e
            ))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::WriteFailed(format!(
                "Failed to sync file {}: {}",
                staging.display(),
                e
            ))
        })?;

        Ok(())
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn read(&self, key: &str) -> StorageResult<Vec<u8>> {
        let path = self.key_to_path(key)?;
        let start = std::time::Instant::now();

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(key.to_string()));
        }

        let data = fs::read(&path).await.map_err(|e| {
            StorageError::ReadFailed(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        tracing::debug!(
            path = %path.display(),
            key = %key,
            size_bytes = data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage read successful"
        );

        Ok(data)
    }

    async fn write(&self, key: &str, data: Vec<u8>, _content_type: &str) -> StorageResult<()> {
        let path = self.key_to_path(key)?;
        let size = data.len();
        let start = std::time::Instant::now();

        self.ensure_parent_dir(&path).await?;

        let staging = Self::staging_path(&path);
        if let Err(e) = self.write_staged(&staging, &data).await {
            let _ = fs::remove_file(&staging).await;
            return Err(e);
        }

        if let Err(e) = fs::rename(&staging, &path).await {
            let _ = fs::remove_file(&staging).await;
            return Err(StorageError::WriteFailed(format!(
                "Failed to move {} into place: {}",
                path.display(),
                e
            )));
        }

        tracing::info!(
            path = %path.display(),
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage write successful"
        );

        Ok(())
    }

    async fn rename(&self, from: &str, to: &str) -> StorageResult<()> {
        let from_path = self.key_to_path(from)?;
        let to_path = self.key_to_path(to)?;

        if !fs::try_exists(&from_path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(from.to_string()));
        }

        self.ensure_parent_dir(&to_path).await?;

        fs::rename(&from_path, &to_path).await.map_err(|e| {
            StorageError::RenameFailed(format!(
                "Failed to rename {} to {}: {}",
                from_path.display(),
                to_path.display(),
                e
            ))
        })?;

        tracing::info!(from_key = %from, to_key = %to, "Local storage rename successful");

        Ok(())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let path = self.key_to_path(key)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(());
        }

        fs::remove_file(&path).await.map_err(|e| {
            StorageError::DeleteFailed(format!("Failed to delete file {}: {}", path.display(), e))
        })?;

        tracing::info!(path = %path.display(), key = %key, "Local storage delete successful");

        Ok(())
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(key)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(all(test, feature = "storage-local"))]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn storage(dir: &Path) -> LocalStorage {
        LocalStorage::new(dir, "http://localhost:3000/api/media/file".to_string())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_local_storage_write_read() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        let data = b"test data".to_vec();
        storage
            .write("media/test.txt", data.clone(), "text/plain")
            .await
            .unwrap();

        assert_eq!(storage.read("media/test.txt").await.unwrap(), data);
    }

    #[tokio::test]
    async fn test_write_replaces_and_leaves_no_staging_files() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        storage
            .write("media/a.png", b"first".to_vec(), "image/png")
            .await
            .unwrap();
        storage
            .write("media/a.png", b"second".to_vec(), "image/png")
            .await
            .unwrap();

        assert_eq!(storage.read("media/a.png").await.unwrap(), b"second");

        let entries: Vec<_> = std::fs::read_dir(dir.path().join("media"))
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(entries, vec!["a.png".to_string()]);
    }

    #[tokio::test]
    async fn test_read_missing_is_not_found() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        let result = storage.read("media/missing.jpg").await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        let result = storage.read("../../../etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.delete("../etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.exists("/etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        storage
            .write("media/gone.txt", b"x".to_vec(), "text/plain")
            .await
            .unwrap();
        storage.delete("media/gone.txt").await.unwrap();
        assert!(!storage.exists("media/gone.txt").await.unwrap());

        storage.delete("media/gone.txt").await.unwrap();
        storage.delete("nonexistent/file.txt").await.unwrap();
    }

    #[tokio::test]
    async fn test_rename() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        storage
            .write("media/from.txt", b"moving".to_vec(), "text/plain")
            .await
            .unwrap();
        storage.rename("media/from.txt", "media/sub/to.txt").await.unwrap();

        assert!(!storage.exists("media/from.txt").await.unwrap());
        assert_eq!(storage.read("media/sub/to.txt").await.unwrap(), b"moving");

        let result = storage.rename("media/from.txt", "media/other.txt").await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_public_url() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "http://cdn.test/files/".to_string())
            .await
            .unwrap();
        assert_eq!(
            storage.public_url("media/x.hex.png"),
            "http://cdn.test/files/media/x.hex.png"
        );
    }
}
