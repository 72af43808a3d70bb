//! Per-asset masking lifecycle.
//!
//! `Pending -> Processing -> Success | Failed`. Every status write is checked against
//! `TransformStatus::can_transition_to`; a job whose asset can no longer fail (terminal
//! or never requested) is skipped.
//!
//! Order of effects on success: write the masked PNG under a key derived from the asset
//! id, point the asset at it in one document update, then delete the original upload.
//! Any failure before the document update leaves the original in place and marks the
//! asset `Failed`. No file is deleted on a failure path.

use async_trait::async_trait;
use hexmask_core::constants::PNG_CONTENT_TYPE;
use hexmask_core::models::{Asset, AssetPatch, TransformStatus};
use hexmask_core::{MaskConfig, TransformError, TransformResultExt};
use hexmask_db::DocumentStore;
use hexmask_processing::{ensure_png, HexMask, ImageTransformer};
use hexmask_storage::keys::masked_key;
use hexmask_storage::Storage;
use hexmask_worker::{JobHandler, JobOutcome, TransformJob};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use uuid::Uuid;

type MaskTask = JoinHandle<Result<Vec<u8>, TransformError>>;

pub struct AssetLifecycle {
    store: Arc<dyn DocumentStore>,
    storage: Arc<dyn Storage>,
    transformer: Arc<dyn ImageTransformer>,
    timeout: Duration,
}

impl AssetLifecycle {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        storage: Arc<dyn Storage>,
        transformer: Arc<dyn ImageTransformer>,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            storage,
            transformer,
            timeout,
        }
    }

    pub fn from_config(
        store: Arc<dyn DocumentStore>,
        storage: Arc<dyn Storage>,
        config: &MaskConfig,
    ) -> Self {
        Self::new(
            store,
            storage,
            Arc::new(HexMask::from_config(config)),
            config.timeout(),
        )
    }

    /// Run one masking job to completion.
    ///
    /// Failures are recorded on the asset and reported as `JobOutcome::Failed`. `Err` is
    /// returned only when recording the failure itself failed.
    ///
    /// A transform that outlived the timeout is awaited after the failure is recorded, so
    /// the queue never starts the next job while pixel work is still running.
    #[tracing::instrument(skip(self, job), fields(asset_id = %job.asset_id, sequence = job.sequence))]
    pub async fn process(&self, job: &TransformJob) -> anyhow::Result<JobOutcome> {
        let asset = match self.store.get_asset(job.asset_id).await {
            Ok(Some(asset)) => asset,
            Ok(None) => {
                tracing::warn!("Asset no longer exists, skipping masking job");
                return Ok(JobOutcome::Skipped("asset not found".to_string()));
            }
            Err(e) => {
                return self
                    .record_failure(job.asset_id, TransformError::persistence("loading asset", e))
                    .await;
            }
        };

        if !asset.transform_status.can_transition_to(TransformStatus::Failed) {
            tracing::warn!(
                status = %asset.transform_status,
                "Asset is not awaiting masking, skipping job"
            );
            return Ok(JobOutcome::Skipped(format!(
                "asset status is {}",
                asset.transform_status
            )));
        }

        let start = Instant::now();
        let mut straggler = None;
        let outcome = match self.run(&asset, &mut straggler).await {
            Ok(updated) => {
                tracing::info!(
                    filename = %updated.filename,
                    size_bytes = updated.file_size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Asset masked"
                );
                Ok(JobOutcome::Succeeded)
            }
            Err(e) => self.record_failure(asset.id, e).await,
        };

        if let Some(task) = straggler {
            tracing::warn!("Waiting for timed-out masking task before the next job");
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "Timed-out masking task did not complete");
            }
        }

        outcome
    }

    async fn run(
        &self,
        asset: &Asset,
        straggler: &mut Option<MaskTask>,
    ) -> Result<Asset, TransformError> {
        let mut status = asset.transform_status;
        if status.can_transition_to(TransformStatus::Processing) {
            self.store
                .update_asset(asset.id, AssetPatch::processing())
                .await
                .persistence("marking asset processing")?;
            status = TransformStatus::Processing;
        }

        let source_key = asset.filename.as_str();
        let source = self
            .storage
            .read(source_key)
            .await
            .persistence("reading source file")?;

        let masked = self.mask_bytes(source, straggler).await?;
        ensure_png(&masked)?;

        if !status.can_transition_to(TransformStatus::Success) {
            return Err(TransformError::transformation(format!(
                "asset cannot move from {} to {}",
                status,
                TransformStatus::Success
            )));
        }

        let target_key = masked_key(asset.id);
        let size = masked.len() as i64;
        self.storage
            .write(&target_key, masked, PNG_CONTENT_TYPE)
            .await
            .persistence("writing masked file")?;

        let updated = self
            .store
            .update_asset(asset.id, AssetPatch::transformed(&target_key, size))
            .await
            .persistence("updating asset")?;

        if source_key != target_key {
            self.remove_original(source_key).await;
        }

        Ok(updated)
    }

    /// Runs the pixel work on a blocking thread, bounded by the configured timeout.
    /// A blocking thread cannot be interrupted; on timeout its handle is left in
    /// `straggler` and its result is discarded.
    async fn mask_bytes(
        &self,
        source: Vec<u8>,
        straggler: &mut Option<MaskTask>,
    ) -> Result<Vec<u8>, TransformError> {
        let transformer = Arc::clone(&self.transformer);
        let mut task = tokio::task::spawn_blocking(move || transformer.transform(&source));

        match tokio::time::timeout(self.timeout, &mut task).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(TransformError::transformation_with_source(
                "masking task did not complete",
                e,
            )),
            Err(_) => {
                *straggler = Some(task);
                Err(TransformError::transformation(format!(
                    "masking timed out after {:?}",
                    self.timeout
                )))
            }
        }
    }

    async fn remove_original(&self, key: &str) {
        match self.storage.delete(key).await {
            Ok(()) => tracing::debug!(key = %key, "Original upload removed"),
            Err(e) => tracing::warn!(
                key = %key,
                error = %e,
                "Could not remove original upload after masking"
            ),
        }
    }

    async fn record_failure(
        &self,
        asset_id: Uuid,
        error: TransformError,
    ) -> anyhow::Result<JobOutcome> {
        let message = error.status_message();
        tracing::error!(
            asset_id = %asset_id,
            kind = error.kind(),
            error = %message,
            "Masking failed"
        );

        match self
            .store
            .update_asset(asset_id, AssetPatch::failed(message.clone()))
            .await
        {
            Ok(_) => Ok(JobOutcome::Failed(message)),
            Err(e) => {
                tracing::error!(
                    asset_id = %asset_id,
                    error = %e,
                    "Could not record masking failure"
                );
                Err(anyhow::Error::new(e).context(format!(
                    "recording failure for asset {}: {}",
                    asset_id, message
                )))
            }
        }
    }
}

#[async_trait]
impl JobHandler for AssetLifecycle {
    async fn process(&self, job: &TransformJob) -> anyhow::Result<JobOutcome> {
        AssetLifecycle::process(self, job).await
    }
}
