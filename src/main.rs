//! PatentPulse gateway binary.
//!
//! ```bash
//! # Defaults: port 8080, analysis service at http://localhost:5000/analyze
//! patentpulse-gateway
//!
//! # Custom configuration
//! PATENTPULSE_COLLABORATOR_URL=http://10.0.0.5:5000/analyze PATENTPULSE_WORKER_COUNT=4 patentpulse-gateway
//! ```

use std::sync::Arc;

use anyhow::{anyhow, Context};
use tokio::net::TcpListener;
use tracing::info;

use patentpulse_gateway::builders::build_http_gateway;
use patentpulse_gateway::config::GatewayConfig;
use patentpulse_gateway::core::AppResult;
use patentpulse_gateway::runtime::{serve, shutdown_signal};
use patentpulse_gateway::util::init_tracing;

#[tokio::main]
async fn main() -> AppResult<()> {
    init_tracing();

    let config = GatewayConfig::from_env().map_err(|e| anyhow!("configuration: {e}"))?;

    info!(
        listen_addr = %config.listen_addr,
        collaborator = %config.collaborator_endpoint,
        worker_count = config.worker_count,
        queue_capacity = config.queue_capacity,
        max_payload_bytes = config.max_payload_bytes,
        "Starting PatentPulse gateway v{}",
        env!("CARGO_PKG_VERSION")
    );

    let gateway = Arc::new(build_http_gateway(&config)?);
    let listener = TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;

    serve(
        listener,
        Arc::clone(&gateway),
        config.max_payload_bytes,
        shutdown_signal(),
    )
    .await?;

    // Answer whatever is still queued before exiting.
    tokio::task::spawn_blocking(move || gateway.shutdown()).await?;
    Ok(())
}
