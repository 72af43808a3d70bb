#[cfg(feature = "storage-local")]
use crate::LocalStorage;
#[cfg(feature = "storage-memory")]
use crate::MemoryStorage;
use crate::{Storage, StorageBackend, StorageError, StorageResult};
use hexmask_core::StorageConfig;
use std::sync::Arc;

/// Create a storage backend based on configuration
pub async fn create_storage(config: &StorageConfig) -> StorageResult<Arc<dyn Storage>> {
    match config.backend {
        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            if config.local_path.is_empty() {
                return Err(StorageError::ConfigError(
                    "LOCAL_STORAGE_PATH not configured".to_string(),
                ));
            }
            let storage =
                LocalStorage::new(&config.local_path, config.local_base_url.clone()).await?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(StorageError::ConfigError(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-memory")]
        StorageBackend::Memory => Ok(Arc::new(MemoryStorage::new())),

        #[cfg(not(feature = "storage-memory"))]
        StorageBackend::Memory => Err(StorageError::ConfigError(
            "Memory storage backend not available (storage-memory feature not enabled)"
                .to_string(),
        )),
    }
}

#[cfg(all(test, feature = "storage-local", feature = "storage-memory"))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_configured_backend() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            backend: StorageBackend::Local,
            local_path: dir.path().to_string_lossy().into_owned(),
            local_base_url: "http://localhost/files".to_string(),
        };
        let storage = create_storage(&config).await.unwrap();
        assert_eq!(storage.backend_type(), StorageBackend::Local);

        let config = StorageConfig {
            backend: StorageBackend::Memory,
            ..config
        };
        let storage = create_storage(&config).await.unwrap();
        assert_eq!(storage.backend_type(), StorageBackend::Memory);
    }

    #[tokio::test]
    async fn rejects_empty_local_path() {
        let config = StorageConfig {
            backend: StorageBackend::Local,
            local_path: String::new(),
            local_base_url: "http://localhost/files".to_string(),
        };
        assert!(matches!(
            create_storage(&config).await,
            Err(StorageError::ConfigError(_))
        ));
    }
}
