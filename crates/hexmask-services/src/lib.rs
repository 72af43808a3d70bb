//! Hexmask Services Layer
//!
//! Orchestration on top of the storage, document store, processing and queue crates:
//! the per-asset masking lifecycle, the read-time status sync for hex images, and the
//! upload entry point that ties them together.

pub mod services;

pub use services::lifecycle::AssetLifecycle;
pub use services::media_link::MediaLinkSync;
pub use services::upload::{UploadRequest, UploadService};

pub use hexmask_db::{DocumentStore, InMemoryDocumentStore, PgDocumentStore};
pub use hexmask_processing::{HexMask, ImageTransformer, MediaValidator};
pub use hexmask_storage::{create_storage, Storage, StorageError};
pub use hexmask_worker::{JobOutcome, TransformJob, TransformQueue};
