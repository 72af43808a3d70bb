//! Serial transform queue.
//!
//! [`TransformQueue::shutdown`] closes the queue and waits until every job already
//! enqueued has run.

use futures::FutureExt;
use parking_lot::Mutex;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::handler::JobHandler;
use crate::job::{JobOutcome, TransformJob};

/// Optional sender notified when a job finishes.
pub type JobFinishedSender = mpsc::Sender<(Uuid, JobOutcome)>;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum QueueError {
    #[error("transform queue is shut down")]
    Closed,
}

struct Intake {
    next_sequence: u64,
    sender: Option<mpsc::UnboundedSender<TransformJob>>,
}

pub struct TransformQueue {
    intake: Mutex<Intake>,
    worker: Mutex<Option<JoinHandle<()>>>,
    depth: Arc<AtomicUsize>,
}

impl TransformQueue {
    /// Start the queue and its worker. Must be called inside a Tokio runtime.
    pub fn new(handler: Arc<dyn JobHandler>) -> Self {
        Self::start(handler, None)
    }

    /// Like [`new`](Self::new), additionally reporting each finished job on `job_finished_tx`.
    pub fn new_with_job_finished(
        handler: Arc<dyn JobHandler>,
        job_finished_tx: JobFinishedSender,
    ) -> Self {
        Self::start(handler, Some(job_finished_tx))
    }

    fn start(handler: Arc<dyn JobHandler>, job_finished_tx: Option<JobFinishedSender>) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let depth = Arc::new(AtomicUsize::new(0));

        let worker = tokio::spawn(Self::worker_loop(
            receiver,
            handler,
            depth.clone(),
            job_finished_tx,
        ));

        Self {
            intake: Mutex::new(Intake {
                next_sequence: 0,
                sender: Some(sender),
            }),
            worker: Mutex::new(Some(worker)),
            depth,
        }
    }

    /// Append a job for `asset_id`. Never blocks and never runs the job inline.
    #[tracing::instrument(skip(self, source_key))]
    pub fn enqueue(
        &self,
        asset_id: Uuid,
        source_key: impl Into<String>,
    ) -> Result<TransformJob, QueueError> {
        let mut intake = self.intake.lock();
        let sequence = intake.next_sequence + 1;
        let job = TransformJob {
            sequence,
            asset_id,
            source_key: source_key.into(),
        };

        let sender = intake.sender.as_ref().ok_or(QueueError::Closed)?;
        self.depth.fetch_add(1, Ordering::SeqCst);
        if sender.send(job.clone()).is_err() {
            self.depth.fetch_sub(1, Ordering::SeqCst);
            return Err(QueueError::Closed);
        }
        intake.next_sequence = sequence;

        tracing::info!(sequence, "Transform job enqueued");
        Ok(job)
    }

    /// Jobs enqueued but not yet finished, including the one running.
    pub fn len(&self) -> usize {
        self.depth.load(Ordering::SeqCst)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_closed(&self) -> bool {
        self.intake.lock().sender.is_none()
    }

    /// Stop accepting jobs, then wait for the worker to finish what is queued.
    pub async fn shutdown(&self) {
        self.intake.lock().sender.take();

        let worker = self.worker.lock().take();
        if let Some(worker) = worker {
            if let Err(e) = worker.await {
                tracing::error!(error = %e, "Transform worker terminated abnormally");
            }
        }
    }

    async fn worker_loop(
        mut receiver: mpsc::UnboundedReceiver<TransformJob>,
        handler: Arc<dyn JobHandler>,
        depth: Arc<AtomicUsize>,
        job_finished_tx: Option<JobFinishedSender>,
    ) {
        tracing::info!("Transform worker started");

        while let Some(job) = receiver.recv().await {
            let outcome = Self::run_job(handler.as_ref(), &job).await;
            depth.fetch_sub(1, Ordering::SeqCst);

            if let Some(tx) = &job_finished_tx {
                if let Err(e) = tx.try_send((job.asset_id, outcome)) {
                    tracing::warn!(
                        asset_id = %job.asset_id,
                        error = %e,
                        "Could not deliver job finished notification"
                    );
                }
            }
        }

        tracing::info!("Transform worker stopped");
    }

    async fn run_job(handler: &dyn JobHandler, job: &TransformJob) -> JobOutcome {
        let start = Instant::now();
        let result = AssertUnwindSafe(handler.process(job)).catch_unwind().await;
        let duration_ms = start.elapsed().as_secs_f64() * 1000.0;

        match result {
            Ok(Ok(outcome)) => {
                tracing::info!(
                    asset_id = %job.asset_id,
                    sequence = job.sequence,
                    outcome = %outcome,
                    duration_ms,
                    "Transform job finished"
                );
                outcome
            }
            Ok(Err(e)) => {
                tracing::error!(
                    asset_id = %job.asset_id,
                    sequence = job.sequence,
                    error = %e,
                    duration_ms,
                    "Transform job handler returned an error"
                );
                JobOutcome::Failed(e.to_string())
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                tracing::error!(
                    asset_id = %job.asset_id,
                    sequence = job.sequence,
                    panic = %message,
                    duration_ms,
                    "Transform job panicked"
                );
                JobOutcome::Failed(format!("job panicked: {}", message))
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::time::Duration;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<u64>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        fail: Mutex<Vec<Uuid>>,
        panic_on: Mutex<Vec<Uuid>>,
    }

    #[async_trait]
    impl JobHandler for Recorder {
        async fn process(&self, job: &TransformJob) -> anyhow::Result<JobOutcome> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(2)).await;
            self.seen.lock().push(job.sequence);
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.panic_on.lock().contains(&job.asset_id) {
                panic!("handler blew up");
            }
            if self.fail.lock().contains(&job.asset_id) {
                anyhow::bail!("could not record failure");
            }
            Ok(JobOutcome::Succeeded)
        }
    }

    #[tokio::test]
    async fn jobs_run_serially_in_enqueue_order() {
        let recorder = Arc::new(Recorder::default());
        let queue = Arc::new(TransformQueue::new(recorder.clone()));

        let mut handles = Vec::new();
        for _ in 0..20 {
            let queue = queue.clone();
            handles.push(tokio::spawn(async move {
                queue.enqueue(Uuid::new_v4(), "media/a.jpg").unwrap()
            }));
        }
        let mut sequences: Vec<u64> = Vec::new();
        for handle in handles {
            sequences.push(handle.await.unwrap().sequence);
        }
        sequences.sort_unstable();
        assert_eq!(sequences, (1..=20).collect::<Vec<u64>>());

        queue.shutdown().await;

        assert_eq!(*recorder.seen.lock(), (1..=20).collect::<Vec<u64>>());
        assert_eq!(recorder.max_in_flight.load(Ordering::SeqCst), 1);
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn failing_and_panicking_jobs_do_not_stop_the_worker() {
        let recorder = Arc::new(Recorder::default());
        let failing = Uuid::new_v4();
        let panicking = Uuid::new_v4();
        let healthy = Uuid::new_v4();
        recorder.fail.lock().push(failing);
        recorder.panic_on.lock().push(panicking);

        let (tx, mut rx) = mpsc::channel(8);
        let queue = TransformQueue::new_with_job_finished(recorder.clone(), tx);

        queue.enqueue(failing, "media/f.jpg").unwrap();
        queue.enqueue(panicking, "media/p.jpg").unwrap();
        queue.enqueue(healthy, "media/h.jpg").unwrap();
        queue.shutdown().await;

        let mut finished = Vec::new();
        while let Ok(item) = rx.try_recv() {
            finished.push(item);
        }
        assert_eq!(finished.len(), 3);
        assert_eq!(finished[0].0, failing);
        assert!(matches!(finished[0].1, JobOutcome::Failed(_)));
        assert_eq!(finished[1].0, panicking);
        assert_eq!(
            finished[1].1,
            JobOutcome::Failed("job panicked: handler blew up".to_string())
        );
        assert_eq!(finished[2], (healthy, JobOutcome::Succeeded));
    }

    #[tokio::test]
    async fn enqueue_after_shutdown_is_rejected() {
        let queue = TransformQueue::new(Arc::new(Recorder::default()));
        queue.shutdown().await;

        assert!(queue.is_closed());
        assert_eq!(
            queue.enqueue(Uuid::new_v4(), "media/late.jpg"),
            Err(QueueError::Closed)
        );
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn outcome_display() {
        assert_eq!(JobOutcome::Succeeded.to_string(), "succeeded");
        assert_eq!(
            JobOutcome::Failed("bad bytes".into()).to_string(),
            "failed: bad bytes"
        );
        assert!(JobOutcome::Succeeded.is_success());
        assert!(!JobOutcome::Skipped("terminal".into()).is_success());
    }
}
