use async_trait::async_trait;
use hexmask_core::models::{Asset, AssetPatch, HexImage, NewAsset, NewHexImage};
use hexmask_core::AppError;
use uuid::Uuid;

/// Persistence for assets and hex images.
///
/// Hex images come back with `transform_status = None` and no `hex_url`; those fields
/// are filled in from the referenced asset by the read path, never stored.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn create_asset(&self, new: NewAsset) -> Result<Asset, AppError>;

    async fn get_asset(&self, id: Uuid) -> Result<Option<Asset>, AppError>;

    /// Applies every field of `patch` in one atomic write and returns the updated asset.
    /// Fails with `NotFound` when the asset does not exist.
    async fn update_asset(&self, id: Uuid, patch: AssetPatch) -> Result<Asset, AppError>;

    async fn find_hex_image_by_asset(&self, asset_id: Uuid) -> Result<Option<HexImage>, AppError>;

    /// Fails with `Conflict` when a hex image already references `new.asset_id`.
    async fn create_hex_image(&self, new: NewHexImage) -> Result<HexImage, AppError>;

    async fn get_hex_image(&self, id: Uuid) -> Result<Option<HexImage>, AppError>;

    /// All hex images, newest first.
    async fn list_hex_images(&self) -> Result<Vec<HexImage>, AppError>;
}
