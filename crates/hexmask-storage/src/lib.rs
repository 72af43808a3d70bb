//! Hexmask Storage Library
//!
//! This crate provides the file-store abstraction used by the masking pipeline: the
//! `Storage` trait and implementations for the local filesystem and process memory.
//!
//! # Storage key format
//!
//! - **Uploaded originals**: `media/{upload_id}.{ext}`
//! - **Masked outputs**: `media/{asset_id}.hex.png`
//!
//! Keys must not contain `..` or a leading `/`. Key generation is centralized in the
//! `keys` module so all backends stay consistent.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-memory")]
pub mod memory;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use hexmask_core::StorageBackend;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-memory")]
pub use memory::MemoryStorage;
pub use traits::{Storage, StorageError, StorageResult};
