//! Bounded FIFO job queue shared by admission and workers.
//!
//! Producers are async: admission waits for a free slot on a timer without
//! holding a thread. Consumers are worker threads that block on the queue.
//! Free slots go to waiting producers in arrival order, so a fresh push can
//! never take a slot an earlier waiter is queued for.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::mpsc::{self, error::TryRecvError, error::TrySendError, Permit, Receiver, Sender};

use super::Job;

/// Why a job could not be placed on the queue.
///
/// The rejected job is handed back so the caller still owns it.
#[derive(Debug, Error)]
pub enum QueueError {
    /// The queue stayed full.
    #[error("job queue is full")]
    Full(Box<Job>),
    /// The queue has been closed.
    #[error("job queue is closed")]
    Closed(Box<Job>),
}

impl QueueError {
    /// Recover the job that was not enqueued.
    #[must_use]
    pub fn into_job(self) -> Job {
        match self {
            Self::Full(job) | Self::Closed(job) => *job,
        }
    }
}

/// Fixed-capacity FIFO of pending jobs.
///
/// A push first reserves a slot and only then hands the job over, so a push
/// that is abandoned while waiting leaves nothing behind. Closing drops the
/// producer side; consumers drain whatever is left and then observe the
/// closure.
pub struct JobQueue {
    capacity: usize,
    /// Producer side. `None` once closed.
    tx: Mutex<Option<Sender<Job>>>,
    /// Consumer side, shared by all workers. Held while a worker waits.
    rx: Mutex<Receiver<Job>>,
    /// Jobs handed over and not yet popped.
    queued: AtomicUsize,
}

impl JobQueue {
    /// Create a queue holding at most `capacity` jobs (at least one).
    #[must_use]
    pub fn bounded(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, rx) = mpsc::channel(capacity);
        Self {
            capacity,
            tx: Mutex::new(Some(tx)),
            rx: Mutex::new(rx),
            queued: AtomicUsize::new(0),
        }
    }

    /// Maximum number of queued jobs.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Jobs currently waiting.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queued.load(Ordering::Acquire)
    }

    /// Whether no job is waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether [`close`](Self::close) has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.lock().is_none()
    }

    /// Clone the producer side, `None` once closed.
    ///
    /// The lock is only held for the clone, never across a wait.
    fn sender(&self) -> Option<Sender<Job>> {
        self.tx.lock().clone()
    }

    /// Hand `job` over through a reserved slot.
    ///
    /// The count is raised before the job becomes visible to consumers, so
    /// a pop can never observe it first.
    fn commit(&self, permit: Permit<'_, Job>, job: Job) {
        self.queued.fetch_add(1, Ordering::AcqRel);
        permit.send(job);
    }

    /// Enqueue without waiting.
    ///
    /// Fails with `Full` while earlier pushes are still waiting for room.
    ///
    /// # Errors
    ///
    /// `Full` if there is no room right now, `Closed` after [`close`](Self::close).
    pub fn try_push(&self, job: Job) -> Result<(), QueueError> {
        let Some(tx) = self.sender() else {
            return Err(QueueError::Closed(Box::new(job)));
        };
        let result = match tx.try_reserve() {
            Ok(permit) => {
                self.commit(permit, job);
                Ok(())
            }
            Err(TrySendError::Full(())) => Err(QueueError::Full(Box::new(job))),
            Err(TrySendError::Closed(())) => Err(QueueError::Closed(Box::new(job))),
        };
        result
    }

    /// Enqueue, waiting at most `wait` for room.
    ///
    /// Waiting does not occupy a thread. Pushes waiting at the same time are
    /// served in arrival order. Dropping the returned future before it
    /// completes leaves the queue untouched.
    ///
    /// # Errors
    ///
    /// `Full` if the wait elapsed, `Closed` after [`close`](Self::close).
    pub async fn push_timeout(&self, job: Job, wait: Duration) -> Result<(), QueueError> {
        let Some(tx) = self.sender() else {
            return Err(QueueError::Closed(Box::new(job)));
        };
        let result = match tokio::time::timeout(wait, tx.reserve()).await {
            Ok(Ok(permit)) => {
                self.commit(permit, job);
                Ok(())
            }
            Ok(Err(_)) => Err(QueueError::Closed(Box::new(job))),
            Err(_) => Err(QueueError::Full(Box::new(job))),
        };
        result
    }

    /// Dequeue the oldest job, blocking while the queue is empty.
    ///
    /// Returns `None` once the queue is closed and drained. Must not be
    /// called from inside an async runtime.
    pub fn pop(&self) -> Option<Job> {
        let job = self.rx.lock().blocking_recv()?;
        self.queued.fetch_sub(1, Ordering::AcqRel);
        Some(job)
    }

    /// Dequeue the oldest job if one is waiting.
    ///
    /// Returns `None` when the queue is empty or closed and drained.
    pub fn try_pop(&self) -> Option<Job> {
        match self.rx.lock().try_recv() {
            Ok(job) => {
                self.queued.fetch_sub(1, Ordering::AcqRel);
                Some(job)
            }
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Stop accepting jobs. Already queued jobs stay available to consumers.
    pub fn close(&self) {
        self.tx.lock().take();
    }
}

impl std::fmt::Debug for JobQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobQueue")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .field("closed", &self.is_closed())
            .finish()
    }
}
