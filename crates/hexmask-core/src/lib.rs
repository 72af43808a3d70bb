//! Hexmask Core Library
//!
//! This crate provides the domain models, error types, configuration and constants
//! shared by every hexmask component.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod storage_types;
pub mod transform_error;

// Re-export commonly used types
pub use config::{Config, MaskConfig, StorageConfig, UploadLimits};
pub use error::AppError;
pub use storage_types::StorageBackend;
pub use transform_error::{TransformError, TransformResultExt};
