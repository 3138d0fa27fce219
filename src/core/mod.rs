//! Core admission-control and worker-pool abstractions.

pub mod admission;
pub mod deadline;
pub mod downstream;
pub mod error;
pub mod executor;
pub mod gateway;
pub mod job;
pub mod job_queue;
pub mod worker_pool;

pub use admission::AdmissionController;
pub use deadline::Deadline;
pub use downstream::{DownstreamClient, DownstreamOutcome};
pub use error::{AppResult, DownstreamError, GatewayError};
pub use executor::{AnalysisBackend, AnalysisReply};
pub use gateway::{Gateway, SharedGateway};
pub use job::{AnalysisResult, Job, JobId, JobState, ResultReceiver, ResultSink, SENTINEL_RISK_SCORE};
pub use job_queue::{JobQueue, QueueError};
pub use worker_pool::{PoolCounters, PoolStats, WorkerPool};
