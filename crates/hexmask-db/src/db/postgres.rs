use super::asset::AssetRepository;
use super::hex_image::HexImageRepository;
use super::store::DocumentStore;
use async_trait::async_trait;
use hexmask_core::models::{Asset, AssetPatch, HexImage, NewAsset, NewHexImage};
use hexmask_core::AppError;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use uuid::Uuid;

/// Postgres-backed document store.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
    assets: AssetRepository,
    hex_images: HexImageRepository,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            assets: AssetRepository::new(pool.clone()),
            hex_images: HexImageRepository::new(pool.clone()),
            pool,
        }
    }

    /// Open a pool against `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(30))
            .connect(database_url)
            .await?;

        tracing::info!(max_connections, "Connected to Postgres");
        Ok(Self::new(pool))
    }

    /// Apply pending schema migrations.
    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to run migrations: {}", e)))?;
        tracing::info!("Database migrations applied");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn create_asset(&self, new: NewAsset) -> Result<Asset, AppError> {
        self.assets.create(new).await
    }

    async fn get_asset(&self, id: Uuid) -> Result<Option<Asset>, AppError> {
        self.assets.get(id).await
    }

    async fn update_asset(&self, id: Uuid, patch: AssetPatch) -> Result<Asset, AppError> {
        self.assets.update(id, patch).await
    }

    async fn find_hex_image_by_asset(&self, asset_id: Uuid) -> Result<Option<HexImage>, AppError> {
        self.hex_images.find_by_asset(asset_id).await
    }

    async fn create_hex_image(&self, new: NewHexImage) -> Result<HexImage, AppError> {
        self.hex_images.create(new).await
    }

    async fn get_hex_image(&self, id: Uuid) -> Result<Option<HexImage>, AppError> {
        self.hex_images.get(id).await
    }

    async fn list_hex_images(&self) -> Result<Vec<HexImage>, AppError> {
        self.hex_images.list().await
    }
}
