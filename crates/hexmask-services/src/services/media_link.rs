//! Hex image reads and the one-record-per-asset creation guard.

use futures::future::join_all;
use hexmask_core::models::{Asset, HexImage, NewHexImage, TransformStatus};
use hexmask_core::AppError;
use hexmask_db::DocumentStore;
use hexmask_storage::Storage;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct MediaLinkSync {
    store: Arc<dyn DocumentStore>,
    storage: Arc<dyn Storage>,
}

impl MediaLinkSync {
    pub fn new(store: Arc<dyn DocumentStore>, storage: Arc<dyn Storage>) -> Self {
        Self { store, storage }
    }

    /// Fill in the mirrored status and URL from the referenced asset.
    ///
    /// Never fails: an asset that cannot be loaded is reported as `Failed` with no URL.
    pub async fn resolve(&self, mut hex_image: HexImage) -> HexImage {
        match self.store.get_asset(hex_image.asset_id).await {
            Ok(Some(asset)) => {
                hex_image.transform_status = asset.transform_status;
                hex_image.hex_url = (asset.transform_status == TransformStatus::Success)
                    .then(|| self.storage.public_url(&asset.filename));
            }
            Ok(None) => {
                tracing::warn!(
                    hex_image_id = %hex_image.id,
                    asset_id = %hex_image.asset_id,
                    "Referenced asset is missing"
                );
                hex_image.transform_status = TransformStatus::Failed;
                hex_image.hex_url = None;
            }
            Err(e) => {
                tracing::warn!(
                    hex_image_id = %hex_image.id,
                    asset_id = %hex_image.asset_id,
                    error = %e,
                    "Could not load referenced asset"
                );
                hex_image.transform_status = TransformStatus::Failed;
                hex_image.hex_url = None;
            }
        }
        hex_image
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<HexImage>, AppError> {
        match self.store.get_hex_image(id).await? {
            Some(hex_image) => Ok(Some(self.resolve(hex_image).await)),
            None => Ok(None),
        }
    }

    pub async fn find_by_asset(&self, asset_id: Uuid) -> Result<Option<HexImage>, AppError> {
        match self.store.find_hex_image_by_asset(asset_id).await? {
            Some(hex_image) => Ok(Some(self.resolve(hex_image).await)),
            None => Ok(None),
        }
    }

    /// Every hex image, newest first, each with its status resolved.
    pub async fn list(&self) -> Result<Vec<HexImage>, AppError> {
        let records = self.store.list_hex_images().await?;
        Ok(join_all(records.into_iter().map(|h| self.resolve(h))).await)
    }

    /// Return the hex image for `asset`, creating it if none exists yet. The record is
    /// resolved like every other read.
    ///
    /// Looks up before creating. A concurrent creator that wins the race surfaces as
    /// `Conflict` from the store, in which case the winner's record is returned.
    #[tracing::instrument(skip(self, asset), fields(asset_id = %asset.id))]
    pub async fn ensure_for_asset(&self, asset: &Asset) -> Result<HexImage, AppError> {
        if let Some(existing) = self.store.find_hex_image_by_asset(asset.id).await? {
            tracing::debug!(hex_image_id = %existing.id, "Hex image already exists");
            return Ok(self.resolve(existing).await);
        }

        let new = NewHexImage::for_asset(asset.id, &asset.original_filename);
        match self.store.create_hex_image(new).await {
            Ok(created) => {
                tracing::info!(
                    hex_image_id = %created.id,
                    title = %created.title,
                    "Hex image created"
                );
                Ok(self.resolve(created).await)
            }
            Err(e) if e.is_conflict() => {
                tracing::debug!("Hex image created concurrently");
                let winner = self
                    .store
                    .find_hex_image_by_asset(asset.id)
                    .await?
                    .ok_or(e)?;
                Ok(self.resolve(winner).await)
            }
            Err(e) => Err(e),
        }
    }
}
