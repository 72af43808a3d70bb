//! Background masking queue.
//!
//! Jobs are processed one at a time, in the order they were enqueued, by a single
//! worker task. A job that fails or panics is reported and the worker moves on.

pub mod handler;
pub mod job;
pub mod queue;

pub use handler::JobHandler;
pub use job::{JobOutcome, TransformJob};
pub use queue::{JobFinishedSender, QueueError, TransformQueue};
