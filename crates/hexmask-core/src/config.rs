//! Configuration module
//!
//! Settings are read from the environment (after loading `.env` when present). Every
//! value has a default so a bare checkout runs against local disk and an in-memory
//! document store.

use std::env;
use std::time::Duration;

use crate::constants::DEFAULT_CANONICAL_SIZE;
use crate::storage_types::StorageBackend;

const DB_MAX_CONNECTIONS: u32 = 5;
const MAX_FILE_SIZE_MB: usize = 10;
const MASK_TIMEOUT_SECS: u64 = 30;
const LOCAL_STORAGE_PATH: &str = "./media";
const LOCAL_STORAGE_BASE_URL: &str = "http://localhost:3000/api/media/file";
const ALLOWED_CONTENT_TYPES: &str = "image/jpeg,image/png,image/gif,image/webp";

/// File store settings.
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub local_path: String,
    pub local_base_url: String,
}

/// Masking settings.
#[derive(Clone, Debug)]
pub struct MaskConfig {
    /// Side length outputs are resized to. `None` keeps the cropped size.
    pub canonical_size: Option<u32>,
    pub timeout_seconds: u64,
}

impl MaskConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self {
            canonical_size: Some(DEFAULT_CANONICAL_SIZE),
            timeout_seconds: MASK_TIMEOUT_SECS,
        }
    }
}

/// Limits applied to uploads before anything is written.
#[derive(Clone, Debug)]
pub struct UploadLimits {
    pub max_file_size_bytes: usize,
    pub allowed_content_types: Vec<String>,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_file_size_bytes: MAX_FILE_SIZE_MB * 1024 * 1024,
            allowed_content_types: split_list(ALLOWED_CONTENT_TYPES),
        }
    }
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub environment: String,
    /// Postgres connection string. Without it the in-memory document store is used.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub storage: StorageConfig,
    pub mask: MaskConfig,
    pub upload: UploadLimits,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let database_url = env::var("DATABASE_URL")
            .ok()
            .filter(|s| !s.trim().is_empty());

        let db_max_connections = env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(DB_MAX_CONNECTIONS);

        let backend = match env::var("STORAGE_BACKEND") {
            Ok(value) => value.parse::<StorageBackend>()?,
            Err(_) => StorageBackend::Local,
        };

        let storage = StorageConfig {
            backend,
            local_path: env::var("LOCAL_STORAGE_PATH")
                .unwrap_or_else(|_| LOCAL_STORAGE_PATH.to_string()),
            local_base_url: env::var("LOCAL_STORAGE_BASE_URL")
                .unwrap_or_else(|_| LOCAL_STORAGE_BASE_URL.to_string()),
        };

        let canonical_size = match env::var("HEX_CANONICAL_SIZE") {
            Ok(value) => match value.trim().parse::<u32>() {
                Ok(0) => None,
                Ok(size) => Some(size),
                Err(_) => {
                    return Err(anyhow::anyhow!(
                        "HEX_CANONICAL_SIZE must be a non-negative integer, got '{}'",
                        value
                    ))
                }
            },
            Err(_) => Some(DEFAULT_CANONICAL_SIZE),
        };

        let timeout_seconds = env::var("HEX_MASK_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(MASK_TIMEOUT_SECS);

        let max_file_size_mb = env::var("MAX_FILE_SIZE_MB")
            .unwrap_or_else(|_| MAX_FILE_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_FILE_SIZE_MB);

        let allowed_content_types = split_list(
            &env::var("ALLOWED_CONTENT_TYPES")
                .unwrap_or_else(|_| ALLOWED_CONTENT_TYPES.to_string()),
        );

        let config = Config {
            environment,
            database_url,
            db_max_connections,
            storage,
            mask: MaskConfig {
                canonical_size,
                timeout_seconds,
            },
            upload: UploadLimits {
                max_file_size_bytes: max_file_size_mb * 1024 * 1024,
                allowed_content_types,
            },
        };
        config.validate()?;
        Ok(config)
    }

    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if let Some(url) = &self.database_url {
            if !url.starts_with("postgres://") && !url.starts_with("postgresql://") {
                return Err(anyhow::anyhow!(
                    "DATABASE_URL must be a valid PostgreSQL connection string"
                ));
            }
        }

        if self.db_max_connections == 0 {
            return Err(anyhow::anyhow!("DB_MAX_CONNECTIONS must be at least 1"));
        }

        if self.storage.backend == StorageBackend::Local && self.storage.local_path.is_empty() {
            return Err(anyhow::anyhow!(
                "LOCAL_STORAGE_PATH is required for the local storage backend"
            ));
        }

        if self.storage.backend == StorageBackend::Memory && self.is_production() {
            return Err(anyhow::anyhow!(
                "STORAGE_BACKEND=memory is not allowed in production"
            ));
        }

        if self.mask.timeout_seconds == 0 {
            return Err(anyhow::anyhow!("HEX_MASK_TIMEOUT_SECS must be at least 1"));
        }

        if self.upload.max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB must be at least 1"));
        }

        if self.upload.allowed_content_types.is_empty() {
            return Err(anyhow::anyhow!("ALLOWED_CONTENT_TYPES must not be empty"));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            database_url: None,
            db_max_connections: DB_MAX_CONNECTIONS,
            storage: StorageConfig {
                backend: StorageBackend::Local,
                local_path: LOCAL_STORAGE_PATH.to_string(),
                local_base_url: LOCAL_STORAGE_BASE_URL.to_string(),
            },
            mask: MaskConfig::default(),
            upload: UploadLimits::default(),
        }
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}
