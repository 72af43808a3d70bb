use crate::traits::{validate_key, Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-process storage. Contents are lost when the last clone is dropped.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    files: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys currently stored, sorted.
    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.files.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn read(&self, key: &str) -> StorageResult<Vec<u8>> {
        validate_key(key)?;
        self.files
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn write(&self, key: &str, data: Vec<u8>, _content_type: &str) -> StorageResult<()> {
        validate_key(key)?;
        let size = data.len();
        self.files.write().await.insert(key.to_string(), data);
        tracing::debug!(key = %key, size_bytes = size, "Memory storage write successful");
        Ok(())
    }

    async fn rename(&self, from: &str, to: &str) -> StorageResult<()> {
        validate_key(from)?;
        validate_key(to)?;
        let mut files = self.files.write().await;
        let data = files
            .remove(from)
            .ok_or_else(|| StorageError::NotFound(from.to_string()))?;
        files.insert(to.to_string(), data);
        Ok(())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        validate_key(key)?;
        self.files.write().await.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        validate_key(key)?;
        Ok(self.files.read().await.contains_key(key))
    }

    fn public_url(&self, key: &str) -> String {
        format!("memory://{}", key)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}
