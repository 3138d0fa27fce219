//! Fixed-size worker pool driving downstream analysis calls.
//!
//! Each worker is a dedicated OS thread with its own single-threaded tokio
//! runtime. Workers block on the shared [`JobQueue`], call the analysis
//! backend under a fresh [`Deadline`], and answer the job through its result
//! sink. The number of workers is the only limiter on in-flight downstream
//! calls.
//!
//! # Design Principles
//!
//! - **No polling**: workers block on the queue; callers await a oneshot
//! - **Survive every job**: backend failures and panics become sentinel results
//! - **Clean shutdown**: closing the queue lets workers drain it and exit

use std::any::Any;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use super::downstream::normalize;
use super::{
    AnalysisBackend, Deadline, DownstreamClient, DownstreamError, GatewayError, Job, JobQueue,
    JobState,
};
use crate::config::GatewayConfig;

/// Statistics about pool utilization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    /// Number of worker threads.
    pub worker_count: usize,

    /// Maximum number of queued jobs.
    pub queue_capacity: usize,

    /// Jobs waiting in the queue.
    pub queued_jobs: u64,

    /// Jobs currently held by a worker.
    pub active_jobs: u64,

    /// Jobs accepted onto the queue.
    pub submitted_jobs: u64,

    /// Jobs shed at admission.
    pub rejected_jobs: u64,

    /// Jobs answered with a real score.
    pub completed_jobs: u64,

    /// Jobs answered with a sentinel result other than a timeout.
    pub failed_jobs: u64,

    /// Jobs whose downstream call hit the deadline.
    pub timed_out_jobs: u64,
}

/// Shared counters behind [`PoolStats`] (lock-free atomics).
#[derive(Debug, Default)]
pub struct PoolCounters {
    active_jobs: AtomicU64,
    submitted_jobs: AtomicU64,
    rejected_jobs: AtomicU64,
    completed_jobs: AtomicU64,
    failed_jobs: AtomicU64,
    timed_out_jobs: AtomicU64,
}

impl PoolCounters {
    pub(crate) fn record_submitted(&self) {
        self.submitted_jobs.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rejected(&self) {
        self.rejected_jobs.fetch_add(1, Ordering::Relaxed);
    }

    fn record_terminal(&self, state: JobState) {
        let counter = match state {
            JobState::TimedOut => &self.timed_out_jobs,
            JobState::Completed => &self.completed_jobs,
            _ => &self.failed_jobs,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of current statistics.
    #[must_use]
    pub fn snapshot(&self, worker_count: usize, queue: &JobQueue) -> PoolStats {
        PoolStats {
            worker_count,
            queue_capacity: queue.capacity(),
            queued_jobs: queue.len() as u64,
            active_jobs: self.active_jobs.load(Ordering::Relaxed),
            submitted_jobs: self.submitted_jobs.load(Ordering::Relaxed),
            rejected_jobs: self.rejected_jobs.load(Ordering::Relaxed),
            completed_jobs: self.completed_jobs.load(Ordering::Relaxed),
            failed_jobs: self.failed_jobs.load(Ordering::Relaxed),
            timed_out_jobs: self.timed_out_jobs.load(Ordering::Relaxed),
        }
    }
}

/// Pool of exactly `worker_count` long-lived workers.
pub struct WorkerPool<B: AnalysisBackend> {
    worker_count: usize,

    /// Queue shared with the admission side.
    queue: Arc<JobQueue>,

    /// Pool statistics counters.
    counters: Arc<PoolCounters>,

    /// Worker thread handles.
    workers: Mutex<Vec<JoinHandle<()>>>,

    /// How long `shutdown` waits for each worker before detaching it.
    join_timeout: Duration,

    /// Shutdown flag.
    shutdown: AtomicBool,

    _backend: PhantomData<fn() -> B>,
}

impl<B: AnalysisBackend> WorkerPool<B> {
    /// Spawn `config.worker_count` workers consuming `queue`.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if the configuration is invalid, `Spawn` if a worker
    /// thread could not be created. Workers already started are stopped
    /// again in that case.
    pub fn start(
        config: &GatewayConfig,
        queue: Arc<JobQueue>,
        counters: Arc<PoolCounters>,
        client: DownstreamClient<B>,
    ) -> Result<Self, GatewayError> {
        config.validate().map_err(GatewayError::InvalidConfig)?;

        let budget = config.downstream_deadline();
        let mut workers = Vec::with_capacity(config.worker_count);

        for worker_id in 0..config.worker_count {
            match spawn_worker(
                worker_id,
                Arc::clone(&queue),
                Arc::clone(&counters),
                client.clone(),
                budget,
            ) {
                Ok(handle) => workers.push(handle),
                Err(e) => {
                    error!(worker_id = worker_id, error = %e, "Failed to spawn worker thread");
                    queue.close();
                    return Err(GatewayError::Spawn(e));
                }
            }
        }

        info!(
            worker_count = config.worker_count,
            queue_capacity = queue.capacity(),
            downstream_deadline_ms = config.downstream_deadline_ms,
            "WorkerPool started"
        );

        Ok(Self {
            worker_count: config.worker_count,
            queue,
            counters,
            workers: Mutex::new(workers),
            join_timeout: budget + Duration::from_secs(1),
            shutdown: AtomicBool::new(false),
            _backend: PhantomData,
        })
    }

    /// Number of workers.
    #[must_use]
    pub const fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Get current pool statistics.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        self.counters.snapshot(self.worker_count, &self.queue)
    }

    /// Shut the pool down.
    ///
    /// Closes the queue so no new jobs are admitted, then joins each worker
    /// once it has answered the jobs still queued. A worker that does not
    /// exit within the join timeout is detached.
    pub fn shutdown(&self) {
        if self.shutdown.swap(true, Ordering::AcqRel) {
            return;
        }

        info!("Shutting down worker pool");
        self.queue.close();

        let mut workers = self.workers.lock();
        let worker_count = workers.len();

        for (idx, worker) in workers.drain(..).enumerate() {
            let (tx, rx) = crossbeam_channel::bounded(1);
            let join_thread = thread::spawn(move || {
                let joined = worker.join().is_ok();
                let _ = tx.send(joined);
            });

            match rx.recv_timeout(self.join_timeout) {
                Ok(true) => debug!(worker_id = idx, "Worker joined"),
                Ok(false) => warn!(worker_id = idx, "Worker panicked"),
                Err(_) => {
                    warn!(worker_id = idx, "Worker did not exit within timeout - detaching");
                    continue;
                }
            }
            let _ = join_thread.join();
        }

        info!(worker_count = worker_count, "Worker pool shut down complete");
    }
}

impl<B: AnalysisBackend> Drop for WorkerPool<B> {
    fn drop(&mut self) {
        // Close without joining; workers finish queued jobs and exit on their own.
        if !self.shutdown.swap(true, Ordering::AcqRel) {
            self.queue.close();
            debug!("WorkerPool dropped without explicit shutdown - workers will be detached");
        }
    }
}

impl<B: AnalysisBackend> std::fmt::Debug for WorkerPool<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("worker_count", &self.worker_count)
            .field("queue", &self.queue)
            .finish_non_exhaustive()
    }
}

/// Spawn one worker thread.
fn spawn_worker<B: AnalysisBackend>(
    worker_id: usize,
    queue: Arc<JobQueue>,
    counters: Arc<PoolCounters>,
    client: DownstreamClient<B>,
    budget: Duration,
) -> std::io::Result<JoinHandle<()>> {
    let (ready_tx, ready_rx) = crossbeam_channel::bounded(1);

    let handle = thread::Builder::new()
        .name(format!("pp-worker-{worker_id}"))
        .spawn(move || {
            // Each worker has its own single-threaded tokio runtime
            let rt = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => {
                    let _ = ready_tx.send(Ok(()));
                    rt
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                    return;
                }
            };
            debug!(worker_id = worker_id, "Worker thread started");

            // pop() returns None only once the queue is closed and drained.
            while let Some(job) = queue.pop() {
                counters.active_jobs.fetch_add(1, Ordering::Relaxed);
                let Job {
                    id,
                    filename,
                    content,
                    sink,
                } = job;
                let mut state = JobState::Queued;
                advance(worker_id, &id, &mut state, JobState::Dispatched);

                debug!(
                    worker_id = worker_id,
                    job_id = %id,
                    filename = %filename,
                    bytes = content.len(),
                    "Worker processing job"
                );

                let deadline = Deadline::after(budget);
                advance(worker_id, &id, &mut state, JobState::AwaitingDownstream);
                let call = {
                    let client = client.clone();
                    let id = id.clone();
                    async move { client.analyze(&id, &content, deadline).await }
                };
                // Run the call as its own task so a panicking backend surfaces
                // as a JoinError instead of unwinding this thread.
                let outcome = match rt.block_on(rt.spawn(call)) {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        let reason = if e.is_panic() {
                            panic_message(&*e.into_panic())
                        } else {
                            "task cancelled".to_string()
                        };
                        error!(worker_id = worker_id, job_id = %id, reason = %reason, "Analysis task aborted");
                        normalize(&id, Err(DownstreamError::Panicked(reason)))
                    }
                };

                advance(worker_id, &id, &mut state, outcome.state);
                counters.record_terminal(state);
                counters.active_jobs.fetch_sub(1, Ordering::Relaxed);

                debug!(
                    worker_id = worker_id,
                    job_id = %id,
                    state = %state,
                    "Worker finished job"
                );

                if !sink.deliver(outcome.result) {
                    debug!(worker_id = worker_id, job_id = %id, "Caller stopped waiting; result dropped");
                }
            }

            debug!(worker_id = worker_id, "Worker queue closed, exiting");
        })?;

    match ready_rx.recv() {
        Ok(Ok(())) => Ok(handle),
        Ok(Err(e)) => Err(e),
        Err(_) => Err(std::io::Error::other("worker thread exited during startup")),
    }
}

/// Move a job to `next`, logging the transition.
fn advance(worker_id: usize, job_id: &str, state: &mut JobState, next: JobState) {
    debug_assert!(state.can_advance_to(next), "illegal job transition {state} -> {next}");
    debug!(worker_id = worker_id, job_id = job_id, from = %state, to = %next, "Job state changed");
    *state = next;
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
