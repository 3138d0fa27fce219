//! Error types for gateway operations.

use std::time::Duration;

use thiserror::Error;

/// Errors surfaced to the caller before or instead of an analysis result.
///
/// Only admission and lifecycle failures live here. Anything that goes wrong
/// after a job has been accepted is folded into a sentinel
/// [`AnalysisResult`](crate::core::AnalysisResult) instead.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The queue stayed full for the whole admission wait window.
    #[error("server busy: job not admitted within {}ms", .waited.as_millis())]
    Busy {
        /// How long the admission attempt waited before shedding the job.
        waited: Duration,
    },
    /// The gateway has been shut down and accepts no new jobs.
    #[error("gateway has been shut down")]
    Shutdown,
    /// The worker holding the job went away without answering.
    #[error("worker dropped job {0} without a result")]
    WorkerLost(String),
    /// Configuration validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// A worker thread could not be started.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Failure kinds of a single downstream analysis call.
///
/// The message text keeps the kind visible once the error is flattened into
/// a sentinel result.
#[derive(Debug, Error)]
pub enum DownstreamError {
    /// The outbound request could not be built locally.
    #[error("failed to create request: {0}")]
    Request(String),
    /// Network failure while talking to the analysis service.
    #[error("analysis service unreachable: {0}")]
    Unreachable(String),
    /// The deadline expired before the analysis service answered.
    #[error("analysis service unreachable: deadline of {}ms exceeded", .budget.as_millis())]
    DeadlineExceeded {
        /// Budget that was granted to the call.
        budget: Duration,
    },
    /// The response body was not a valid analysis payload.
    #[error("invalid JSON from analysis service: {0}")]
    InvalidResponse(String),
    /// The backend panicked while handling the job.
    #[error("analysis worker panicked: {0}")]
    Panicked(String),
}

impl DownstreamError {
    /// Whether this failure was caused by the deadline expiring.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::DeadlineExceeded { .. })
    }
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
