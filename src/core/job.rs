//! Job records, analysis results, and the single-shot result sink.

use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use uuid::Uuid;

/// Risk score carried by every result produced after a failure.
pub const SENTINEL_RISK_SCORE: i64 = -1;

/// Identifier correlating a job with its result.
pub type JobId = String;

/// Outcome of one document analysis, returned to the caller unmodified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Identifier of the job that produced this result.
    pub job_id: JobId,
    /// Score reported by the analysis service, or `-1` on failure.
    pub risk_score: i64,
    /// Keywords in the order the analysis service reported them.
    pub keywords: Vec<String>,
    /// Human-readable failure description; absent on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisResult {
    /// Build a successful result.
    pub fn completed(job_id: impl Into<JobId>, risk_score: i64, keywords: Vec<String>) -> Self {
        Self {
            job_id: job_id.into(),
            risk_score,
            keywords,
            error: None,
        }
    }

    /// Build a sentinel result describing a failure.
    pub fn failed(job_id: impl Into<JobId>, error: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            risk_score: SENTINEL_RISK_SCORE,
            keywords: Vec::new(),
            error: Some(error.into()),
        }
    }

    /// Whether this is a sentinel (failure) result.
    #[must_use]
    pub fn is_sentinel(&self) -> bool {
        self.risk_score == SENTINEL_RISK_SCORE && self.error.is_some()
    }
}

/// Lifecycle of a job inside the gateway.
///
/// `TimedOut` and `Failed` both end in a sentinel result. There is no
/// transition out of a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// Waiting in the job queue.
    Queued,
    /// Picked up by a worker.
    Dispatched,
    /// Downstream call in flight.
    AwaitingDownstream,
    /// The analysis service answered with a decodable result.
    Completed,
    /// The deadline expired before the analysis service answered.
    TimedOut,
    /// Any other failure after acceptance.
    Failed,
}

impl JobState {
    /// Whether no further transition is possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::TimedOut | Self::Failed)
    }

    /// Whether `next` directly follows `self` in a job's lifecycle.
    ///
    /// `Queued -> Dispatched -> AwaitingDownstream -> {Completed, TimedOut,
    /// Failed}`. A dispatched job may also fail before its call starts.
    #[must_use]
    pub const fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Queued, Self::Dispatched)
                | (Self::Dispatched, Self::AwaitingDownstream | Self::Failed)
                | (
                    Self::AwaitingDownstream,
                    Self::Completed | Self::TimedOut | Self::Failed
                )
        )
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Queued => "queued",
            Self::Dispatched => "dispatched",
            Self::AwaitingDownstream => "awaiting_downstream",
            Self::Completed => "completed",
            Self::TimedOut => "timed_out",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Write-once handle a worker uses to answer a job.
///
/// Delivering consumes the sink, so a second write cannot be expressed.
#[derive(Debug)]
pub struct ResultSink {
    tx: oneshot::Sender<AnalysisResult>,
}

impl ResultSink {
    /// Deliver the result to the waiting caller.
    ///
    /// Returns `false` if the caller stopped waiting (e.g. the client
    /// disconnected); the result is discarded in that case.
    pub fn deliver(self, result: AnalysisResult) -> bool {
        self.tx.send(result).is_ok()
    }
}

/// Read side of a job's result sink, held by the admission path.
#[derive(Debug)]
pub struct ResultReceiver {
    job_id: JobId,
    rx: oneshot::Receiver<AnalysisResult>,
}

impl ResultReceiver {
    /// Identifier of the job this receiver belongs to.
    #[must_use]
    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Wait for the worker's answer.
    ///
    /// Returns `None` if the sink was dropped without a delivery.
    pub async fn recv(self) -> Option<AnalysisResult> {
        self.rx.await.ok()
    }

    /// Blocking variant of [`recv`](Self::recv).
    ///
    /// Must not be called from inside an async runtime.
    #[must_use]
    pub fn blocking_recv(self) -> Option<AnalysisResult> {
        self.rx.blocking_recv().ok()
    }
}

/// One unit of work: a document waiting to be analysed.
#[derive(Debug)]
pub struct Job {
    /// Correlation identifier.
    pub id: JobId,
    /// Filename supplied with the upload.
    pub filename: String,
    /// Raw document bytes.
    pub content: Vec<u8>,
    /// Where the worker delivers the result.
    pub sink: ResultSink,
}

impl Job {
    /// Create a job with a fresh identifier and a connected result channel.
    pub fn new(filename: impl Into<String>, content: Vec<u8>) -> (Self, ResultReceiver) {
        let id = Uuid::new_v4().to_string();
        let (tx, rx) = oneshot::channel();
        let job = Self {
            id: id.clone(),
            filename: filename.into(),
            content,
            sink: ResultSink { tx },
        };
        (job, ResultReceiver { job_id: id, rx })
    }
}
