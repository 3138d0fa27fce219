//! Admission control: bounded-wait enqueue with load shedding.
//!
//! A job either makes it onto the [`JobQueue`] within the admission wait
//! window or is rejected with [`GatewayError::Busy`] without ever being
//! sent. Once enqueued, the caller waits on the job's result sink until a
//! worker answers; there is no other exit path.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::{
    AnalysisResult, GatewayError, Job, JobQueue, JobState, PoolCounters, QueueError, ResultReceiver,
};

/// Gatekeeper in front of the job queue.
#[derive(Debug, Clone)]
pub struct AdmissionController {
    queue: Arc<JobQueue>,
    counters: Arc<PoolCounters>,
    wait: Duration,
}

impl AdmissionController {
    /// Create a controller feeding `queue`, waiting at most `wait` for room.
    #[must_use]
    pub const fn new(queue: Arc<JobQueue>, counters: Arc<PoolCounters>, wait: Duration) -> Self {
        Self {
            queue,
            counters,
            wait,
        }
    }

    /// Admission wait window.
    #[must_use]
    pub const fn wait(&self) -> Duration {
        self.wait
    }

    /// Submit a document and wait for its analysis (async API).
    ///
    /// # Errors
    ///
    /// - `GatewayError::Busy` if the queue stayed full for the wait window
    /// - `GatewayError::Shutdown` if the gateway no longer accepts jobs
    /// - `GatewayError::WorkerLost` if the job was dropped without an answer
    pub async fn submit_async(
        &self,
        filename: impl Into<String>,
        content: Vec<u8>,
    ) -> Result<AnalysisResult, GatewayError> {
        let rx = self.enqueue_async(filename.into(), content).await?;
        let job_id = rx.job_id().to_string();
        rx.recv().await.ok_or(GatewayError::WorkerLost(job_id))
    }

    /// Place a new job on the queue and hand back its result receiver.
    ///
    /// Waits at most the admission window for room. The wait holds no
    /// thread, and concurrent waiters are admitted in arrival order.
    /// Dropping the future while it waits leaves nothing on the queue.
    ///
    /// # Errors
    ///
    /// `Busy` or `Shutdown`, see [`submit_async`](Self::submit_async).
    pub async fn enqueue_async(
        &self,
        filename: String,
        content: Vec<u8>,
    ) -> Result<ResultReceiver, GatewayError> {
        let (job, rx) = Job::new(filename, content);

        // Counting happens in the same poll that commits the job.
        let pushed = self.queue.push_timeout(job, self.wait).await;
        self.admit(pushed)?;

        debug!(job_id = %rx.job_id(), state = %JobState::Queued, "Job admitted");
        Ok(rx)
    }

    fn admit(&self, pushed: Result<(), QueueError>) -> Result<(), GatewayError> {
        match pushed {
            Ok(()) => {
                self.counters.record_submitted();
                Ok(())
            }
            Err(QueueError::Full(job)) => {
                self.counters.record_rejected();
                warn!(
                    job_id = %job.id,
                    filename = %job.filename,
                    waited_ms = self.wait.as_millis(),
                    "Job queue full - shedding load"
                );
                Err(GatewayError::Busy { waited: self.wait })
            }
            Err(QueueError::Closed(job)) => {
                debug!(job_id = %job.id, "Job rejected - gateway shut down");
                Err(GatewayError::Shutdown)
            }
        }
    }
}
