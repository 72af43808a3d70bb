use async_trait::async_trait;

use crate::job::{JobOutcome, TransformJob};

/// Work performed for each dequeued job.
///
/// Implementations record failures on the asset themselves and return
/// `Ok(JobOutcome::Failed(..))`. An `Err` means the failure could not be recorded; the
/// queue logs it and continues with the next job.
#[async_trait]
pub trait JobHandler: Send + Sync {
    async fn process(&self, job: &TransformJob) -> anyhow::Result<JobOutcome>;
}
