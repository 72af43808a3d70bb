//! Wires the pipeline together from configuration.

use anyhow::Context;
use hexmask_core::Config;
use hexmask_db::{DocumentStore, InMemoryDocumentStore, PgDocumentStore};
use hexmask_services::{AssetLifecycle, MediaLinkSync, UploadService};
use hexmask_storage::{create_storage, Storage};
use hexmask_worker::{JobOutcome, TransformQueue};
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Capacity of the job finished channel.
const FINISHED_CHANNEL_CAPACITY: usize = 64;

pub struct App {
    pub config: Config,
    pub store: Arc<dyn DocumentStore>,
    pub storage: Arc<dyn Storage>,
    pub queue: Arc<TransformQueue>,
    pub uploads: UploadService,
    pub link: MediaLinkSync,
    pub finished: mpsc::Receiver<(Uuid, JobOutcome)>,
}

impl App {
    /// Connect the stores and start the masking queue. Must run inside a Tokio runtime.
    pub async fn build(config: Config) -> anyhow::Result<Self> {
        let storage = create_storage(&config.storage)
            .await
            .context("Failed to initialize storage")?;

        let store: Arc<dyn DocumentStore> = match &config.database_url {
            Some(url) => {
                let pg = PgDocumentStore::connect(url, config.db_max_connections)
                    .await
                    .context("Failed to connect to database")?;
                pg.migrate().await.context("Failed to run migrations")?;
                Arc::new(pg)
            }
            None => {
                tracing::warn!(
                    "DATABASE_URL not set; records live in memory and are lost on exit"
                );
                Arc::new(InMemoryDocumentStore::new())
            }
        };

        let lifecycle = Arc::new(AssetLifecycle::from_config(
            store.clone(),
            storage.clone(),
            &config.mask,
        ));
        let (finished_tx, finished) = mpsc::channel(FINISHED_CHANNEL_CAPACITY);
        let queue = Arc::new(TransformQueue::new_with_job_finished(lifecycle, finished_tx));

        let uploads = UploadService::new(
            store.clone(),
            storage.clone(),
            queue.clone(),
            &config.upload,
        );
        let link = MediaLinkSync::new(store.clone(), storage.clone());

        tracing::info!(
            storage_backend = %storage.backend_type(),
            persistent_store = config.database_url.is_some(),
            canonical_size = ?config.mask.canonical_size,
            "Pipeline ready"
        );

        Ok(Self {
            config,
            store,
            storage,
            queue,
            uploads,
            link,
            finished,
        })
    }

    /// Wait for the job of `asset_id` to finish, up to the masking timeout plus a margin.
    pub async fn wait_for(&mut self, asset_id: Uuid) -> anyhow::Result<JobOutcome> {
        let limit = self.config.mask.timeout() + std::time::Duration::from_secs(30);
        let wait = async {
            while let Some((id, outcome)) = self.finished.recv().await {
                if id == asset_id {
                    return Some(outcome);
                }
            }
            None
        };

        match tokio::time::timeout(limit, wait).await {
            Ok(Some(outcome)) => Ok(outcome),
            Ok(None) => Err(anyhow::anyhow!("Transform queue stopped before the job finished")),
            Err(_) => Err(anyhow::anyhow!(
                "Timed out waiting for asset {} to be masked",
                asset_id
            )),
        }
    }

    pub async fn shutdown(&self) {
        self.queue.shutdown().await;
    }
}
