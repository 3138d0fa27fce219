//! Gateway facade tying admission, queue and workers together.

use std::sync::Arc;

use super::{AdmissionController, AnalysisBackend, AnalysisResult, GatewayError, PoolStats, WorkerPool};

/// A running analysis gateway.
///
/// Owns one job queue, the admission controller in front of it, and the
/// worker pool behind it. Independent gateways share nothing.
#[derive(Debug)]
pub struct Gateway<B: AnalysisBackend> {
    admission: AdmissionController,
    pool: WorkerPool<B>,
}

impl<B: AnalysisBackend> Gateway<B> {
    pub(crate) const fn new(admission: AdmissionController, pool: WorkerPool<B>) -> Self {
        Self { admission, pool }
    }

    /// Admission controller, cheap to clone into request handlers.
    #[must_use]
    pub const fn admission(&self) -> &AdmissionController {
        &self.admission
    }

    /// Submit a document and wait for its analysis.
    ///
    /// # Errors
    ///
    /// See [`AdmissionController::submit_async`].
    pub async fn submit(
        &self,
        filename: impl Into<String>,
        content: Vec<u8>,
    ) -> Result<AnalysisResult, GatewayError> {
        self.admission.submit_async(filename, content).await
    }

    /// Current pool statistics.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        self.pool.stats()
    }

    /// Stop accepting jobs, answer the queued ones, and join the workers.
    ///
    /// Blocks the calling thread while workers drain.
    pub fn shutdown(&self) {
        self.pool.shutdown();
    }
}

/// Shared handle used by the HTTP layer.
pub type SharedGateway<B> = Arc<Gateway<B>>;
