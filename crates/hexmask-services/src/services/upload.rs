//! Upload entry point.
//!
//! An upload is accepted, stored and recorded before any masking happens. Masking runs
//! later on the queue; its outcome is observed through the asset status.

use hexmask_core::models::{Asset, AssetPatch, NewAsset, TransformStatus};
use hexmask_core::{AppError, UploadLimits};
use hexmask_db::DocumentStore;
use hexmask_processing::{MediaValidator, ValidationError};
use hexmask_storage::keys::upload_key;
use hexmask_storage::Storage;
use hexmask_worker::TransformQueue;
use std::sync::Arc;
use uuid::Uuid;

use super::media_link::MediaLinkSync;

/// A completed upload as received from the caller.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub data: Vec<u8>,
    pub original_filename: String,
    pub content_type: String,
    pub alt: String,
    pub mask_requested: bool,
}

pub struct UploadService {
    store: Arc<dyn DocumentStore>,
    storage: Arc<dyn Storage>,
    queue: Arc<TransformQueue>,
    link: MediaLinkSync,
    validator: MediaValidator,
}

impl UploadService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        storage: Arc<dyn Storage>,
        queue: Arc<TransformQueue>,
        limits: &UploadLimits,
    ) -> Self {
        Self {
            link: MediaLinkSync::new(store.clone(), storage.clone()),
            store,
            storage,
            queue,
            validator: MediaValidator::from_limits(limits),
        }
    }

    pub fn link(&self) -> &MediaLinkSync {
        &self.link
    }

    /// Validate, store and record an upload, then hand it to the masking queue.
    ///
    /// Errors cover only the upload itself. Whatever happens during masking is reported
    /// through the asset's status.
    #[tracing::instrument(
        skip(self, request),
        fields(original_filename = %request.original_filename, size_bytes = request.data.len())
    )]
    pub async fn upload(&self, request: UploadRequest) -> Result<Asset, AppError> {
        let alt = request.alt.trim();
        if alt.is_empty() {
            return Err(AppError::InvalidInput("alt text is required".to_string()));
        }

        self.validator
            .validate(
                &request.original_filename,
                request.data.len(),
                &request.content_type,
            )
            .map_err(validation_error)?;

        let key = upload_key(Uuid::new_v4(), &request.original_filename);
        let file_size = request.data.len() as i64;
        self.storage
            .write(&key, request.data, &request.content_type)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        let new = NewAsset {
            alt: alt.to_string(),
            filename: key.clone(),
            original_filename: request.original_filename,
            content_type: request.content_type,
            file_size,
            mask_requested: request.mask_requested,
        };

        let asset = match self.store.create_asset(new).await {
            Ok(asset) => asset,
            Err(e) => {
                if let Err(cleanup) = self.storage.delete(&key).await {
                    tracing::warn!(key = %key, error = %cleanup, "Could not remove orphaned upload");
                }
                return Err(e);
            }
        };

        tracing::info!(
            asset_id = %asset.id,
            key = %key,
            mask_requested = asset.mask_requested,
            "Upload stored"
        );

        Ok(self.on_upload_completed(asset).await)
    }

    /// Post-upload hook: ensure the hex image exists and queue the masking job.
    ///
    /// Assets that are not pending pass through untouched. A failed creation guard is
    /// logged and masking still proceeds. If the job cannot be queued the asset is
    /// marked `Failed`.
    pub async fn on_upload_completed(&self, asset: Asset) -> Asset {
        if !asset.mask_requested || asset.transform_status != TransformStatus::Pending {
            return asset;
        }

        if let Err(e) = self.link.ensure_for_asset(&asset).await {
            tracing::warn!(asset_id = %asset.id, error = %e, "Could not create hex image");
        }

        match self.queue.enqueue(asset.id, asset.filename.clone()) {
            Ok(job) => {
                tracing::debug!(asset_id = %asset.id, sequence = job.sequence, "Masking queued");
                asset
            }
            Err(e) => {
                tracing::error!(asset_id = %asset.id, error = %e, "Could not queue masking job");
                let patch = AssetPatch::failed(format!("could not queue masking job: {}", e));
                match self.store.update_asset(asset.id, patch).await {
                    Ok(updated) => updated,
                    Err(update_err) => {
                        tracing::error!(
                            asset_id = %asset.id,
                            error = %update_err,
                            "Could not record masking failure"
                        );
                        asset
                    }
                }
            }
        }
    }
}

fn validation_error(err: ValidationError) -> AppError {
    match err {
        ValidationError::FileTooLarge { .. } => AppError::PayloadTooLarge(err.to_string()),
        _ => AppError::InvalidInput(err.to_string()),
    }
}
