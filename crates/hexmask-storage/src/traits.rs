//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Rename failed: {0}")]
    RenameFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// The masking pipeline only ever needs whole-file operations on named blobs. Keys are
/// produced by the [`keys`](crate::keys) module.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Read a file. Fails with `NotFound` when the key does not exist.
    async fn read(&self, key: &str) -> StorageResult<Vec<u8>>;

    /// Write a file, replacing any existing content.
    ///
    /// When this returns `Ok` the complete content is durable under `key`; a failed write
    /// never leaves a truncated file under `key`.
    async fn write(&self, key: &str, data: Vec<u8>, content_type: &str) -> StorageResult<()>;

    /// Move a file to a new key. Fails with `NotFound` when `from` does not exist.
    async fn rename(&self, from: &str, to: &str) -> StorageResult<()>;

    /// Delete a file. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Check if a file exists
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Public URL the file is served under.
    fn public_url(&self, key: &str) -> String;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}

/// Rejects keys that could escape the storage root.
pub(crate) fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey("Storage key is empty".to_string()));
    }
    if key.contains("..") || key.starts_with('/') || key.contains('\\') {
        return Err(StorageError::InvalidKey(
            "Storage key contains invalid characters".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_validation() {
        assert!(validate_key("media/a.png").is_ok());
        assert!(matches!(validate_key(""), Err(StorageError::InvalidKey(_))));
        assert!(matches!(
            validate_key("../etc/passwd"),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(
            validate_key("/etc/passwd"),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(
            validate_key("media\\a.png"),
            Err(StorageError::InvalidKey(_))
        ));
    }
}
