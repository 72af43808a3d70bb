use std::fmt;
use uuid::Uuid;

/// A request to mask one asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformJob {
    /// Position in the queue, starting at 1. Jobs run in increasing sequence order.
    pub sequence: u64,
    pub asset_id: Uuid,
    /// Storage key of the uploaded file at enqueue time.
    pub source_key: String,
}

/// How a job ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Succeeded,
    /// The asset was marked failed with this message.
    Failed(String),
    /// Nothing to do, e.g. the asset is no longer pending.
    Skipped(String),
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, JobOutcome::Succeeded)
    }
}

impl fmt::Display for JobOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobOutcome::Succeeded => write!(f, "succeeded"),
            JobOutcome::Failed(msg) => write!(f, "failed: {}", msg),
            JobOutcome::Skipped(reason) => write!(f, "skipped: {}", reason),
        }
    }
}
