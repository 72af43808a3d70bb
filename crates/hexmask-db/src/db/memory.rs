use super::store::DocumentStore;
use async_trait::async_trait;
use chrono::Utc;
use hexmask_core::models::{
    Asset, AssetPatch, HexImage, NewAsset, NewHexImage, TransformStatus,
};
use hexmask_core::AppError;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Document store kept in process memory. Contents are lost on restart.
#[derive(Clone, Default)]
pub struct InMemoryDocumentStore {
    assets: Arc<RwLock<HashMap<Uuid, Asset>>>,
    hex_images: Arc<RwLock<HashMap<Uuid, HexImage>>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn asset_count(&self) -> usize {
        self.assets.read().await.len()
    }

    pub async fn hex_image_count(&self) -> usize {
        self.hex_images.read().await.len()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn create_asset(&self, new: NewAsset) -> Result<Asset, AppError> {
        let now = Utc::now();
        let asset = Asset {
            id: Uuid::new_v4(),
            transform_status: new.initial_status(),
            alt: new.alt,
            filename: new.filename,
            original_filename: new.original_filename,
            content_type: new.content_type,
            file_size: new.file_size,
            mask_requested: new.mask_requested,
            transform_error: None,
            created_at: now,
            updated_at: now,
        };
        self.assets.write().await.insert(asset.id, asset.clone());
        Ok(asset)
    }

    async fn get_asset(&self, id: Uuid) -> Result<Option<Asset>, AppError> {
        Ok(self.assets.read().await.get(&id).cloned())
    }

    async fn update_asset(&self, id: Uuid, patch: AssetPatch) -> Result<Asset, AppError> {
        let mut assets = self.assets.write().await;
        let asset = assets
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("asset {}", id)))?;
        asset.apply(&patch);
        Ok(asset.clone())
    }

    async fn find_hex_image_by_asset(&self, asset_id: Uuid) -> Result<Option<HexImage>, AppError> {
        Ok(self
            .hex_images
            .read()
            .await
            .values()
            .find(|h| h.asset_id == asset_id)
            .cloned())
    }

    async fn create_hex_image(&self, new: NewHexImage) -> Result<HexImage, AppError> {
        // Check and insert under one write lock.
        let mut hex_images = self.hex_images.write().await;
        if hex_images.values().any(|h| h.asset_id == new.asset_id) {
            return Err(AppError::Conflict(format!(
                "hex image for asset {} already exists",
                new.asset_id
            )));
        }

        let now = Utc::now();
        let hex_image = HexImage {
            id: Uuid::new_v4(),
            title: new.title,
            description: new.description,
            asset_id: new.asset_id,
            transform_status: TransformStatus::None,
            hex_url: None,
            created_at: now,
            updated_at: now,
        };
        hex_images.insert(hex_image.id, hex_image.clone());
        Ok(hex_image)
    }

    async fn get_hex_image(&self, id: Uuid) -> Result<Option<HexImage>, AppError> {
        Ok(self.hex_images.read().await.get(&id).cloned())
    }

    async fn list_hex_images(&self) -> Result<Vec<HexImage>, AppError> {
        let mut all: Vec<HexImage> = self.hex_images.read().await.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_asset(mask_requested: bool) -> NewAsset {
        NewAsset {
            alt: "a photo".to_string(),
            filename: "media/upload.jpg".to_string(),
            original_filename: "photo.jpg".to_string(),
            content_type: "image/jpeg".to_string(),
            file_size: 2048,
            mask_requested,
        }
    }

    #[tokio::test]
    async fn create_sets_initial_status() {
        let store = InMemoryDocumentStore::new();
        let masked = store.create_asset(new_asset(true)).await.unwrap();
        let plain = store.create_asset(new_asset(false)).await.unwrap();

        assert_eq!(masked.transform_status, TransformStatus::Pending);
        assert_eq!(plain.transform_status, TransformStatus::None);
        assert_eq!(store.asset_count().await, 2);
    }

    #[tokio::test]
    async fn update_applies_whole_patch() {
        let store = InMemoryDocumentStore::new();
        let asset = store.create_asset(new_asset(true)).await.unwrap();

        let updated = store
            .update_asset(asset.id, AssetPatch::transformed("media/x.hex.png", 999))
            .await
            .unwrap();

        assert_eq!(updated.filename, "media/x.hex.png");
        assert_eq!(updated.content_type, "image/png");
        assert_eq!(updated.file_size, 999);
        assert_eq!(updated.transform_status, TransformStatus::Success);
        assert_eq!(
            store.get_asset(asset.id).await.unwrap().unwrap(),
            updated
        );
    }

    #[tokio::test]
    async fn failed_patch_keeps_file_fields() {
        let store = InMemoryDocumentStore::new();
        let asset = store.create_asset(new_asset(true)).await.unwrap();

        let updated = store
            .update_asset(asset.id, AssetPatch::failed("could not decode"))
            .await
            .unwrap();

        assert_eq!(updated.filename, asset.filename);
        assert_eq!(updated.transform_status, TransformStatus::Failed);
        assert_eq!(updated.transform_error.as_deref(), Some("could not decode"));
    }

    #[tokio::test]
    async fn update_missing_asset_is_not_found() {
        let store = InMemoryDocumentStore::new();
        let err = store
            .update_asset(Uuid::new_v4(), AssetPatch::processing())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn hex_image_unique_per_asset() {
        let store = InMemoryDocumentStore::new();
        let asset_id = Uuid::new_v4();

        let first = store
            .create_hex_image(NewHexImage::for_asset(asset_id, "photo.jpg"))
            .await
            .unwrap();
        assert_eq!(first.title, "photo");

        let err = store
            .create_hex_image(NewHexImage::for_asset(asset_id, "photo.jpg"))
            .await
            .unwrap_err();
        assert!(err.is_conflict());

        let found = store.find_hex_image_by_asset(asset_id).await.unwrap();
        assert_eq!(found.map(|h| h.id), Some(first.id));
        assert_eq!(store.hex_image_count().await, 1);
    }

    #[tokio::test]
    async fn concurrent_creates_yield_one_record() {
        let store = InMemoryDocumentStore::new();
        let asset_id = Uuid::new_v4();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .create_hex_image(NewHexImage::for_asset(asset_id, "a.png"))
                    .await
            }));
        }

        let mut created = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(e) => assert!(e.is_conflict()),
            }
        }
        assert_eq!(created, 1);
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let store = InMemoryDocumentStore::new();
        let older = store
            .create_hex_image(NewHexImage::for_asset(Uuid::new_v4(), "older.png"))
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let newer = store
            .create_hex_image(NewHexImage::for_asset(Uuid::new_v4(), "newer.png"))
            .await
            .unwrap();

        let ids: Vec<Uuid> = store
            .list_hex_images()
            .await
            .unwrap()
            .into_iter()
            .map(|h| h.id)
            .collect();
        assert_eq!(ids, vec![newer.id, older.id]);
    }
}
