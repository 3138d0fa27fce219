//! Builders to construct a running gateway from configuration.

use std::sync::Arc;

use tracing::info;

use crate::config::GatewayConfig;
use crate::core::{
    AdmissionController, AnalysisBackend, DownstreamClient, Gateway, GatewayError, JobQueue,
    PoolCounters, WorkerPool,
};
use crate::infra::HttpAnalysisBackend;

/// Build and start a gateway around `backend`.
///
/// Creates a fresh job queue, starts `worker_count` workers on it, and puts
/// an admission controller in front. Nothing is shared with other gateways.
///
/// # Errors
///
/// `GatewayError::InvalidConfig` if `cfg` fails validation,
/// `GatewayError::Spawn` if a worker could not be started.
pub fn build_gateway<B: AnalysisBackend>(
    cfg: &GatewayConfig,
    backend: B,
) -> Result<Gateway<B>, GatewayError> {
    cfg.validate().map_err(GatewayError::InvalidConfig)?;

    let queue = Arc::new(JobQueue::bounded(cfg.queue_capacity));
    let counters = Arc::new(PoolCounters::default());
    let pool = WorkerPool::start(
        cfg,
        Arc::clone(&queue),
        Arc::clone(&counters),
        DownstreamClient::new(backend),
    )?;
    let admission = AdmissionController::new(queue, counters, cfg.admission_wait_timeout());

    info!(
        queue_capacity = cfg.queue_capacity,
        worker_count = cfg.worker_count,
        admission_wait_ms = cfg.admission_wait_timeout_ms,
        "Gateway ready"
    );

    Ok(Gateway::new(admission, pool))
}

/// Build a gateway talking to `cfg.collaborator_endpoint` over HTTP.
///
/// # Errors
///
/// See [`build_gateway`].
pub fn build_http_gateway(cfg: &GatewayConfig) -> Result<Gateway<HttpAnalysisBackend>, GatewayError> {
    let backend = HttpAnalysisBackend::new(cfg.collaborator_endpoint.clone())?;
    build_gateway(cfg, backend)
}
