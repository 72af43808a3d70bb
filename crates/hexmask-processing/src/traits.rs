//! Processing traits

use hexmask_core::TransformError;

/// Pixel transform applied by a masking job.
///
/// Synchronous and CPU-bound. Async callers run it on a blocking thread.
pub trait ImageTransformer: Send + Sync {
    /// Transform `data` and return the encoded output.
    fn transform(&self, data: &[u8]) -> Result<Vec<u8>, TransformError>;
}
