//! HTTP server lifecycle.

use std::future::Future;

use tokio::net::TcpListener;
use tracing::{info, warn};

use super::api::router;
use crate::core::{AnalysisBackend, AppResult, SharedGateway};

/// Serve the gateway router on `listener` until `shutdown` resolves.
///
/// In-flight requests finish before this returns; the worker pool itself is
/// left running for the caller to shut down.
///
/// # Errors
///
/// Returns an error if the listener fails while accepting connections.
pub async fn serve<B, F>(
    listener: TcpListener,
    gateway: SharedGateway<B>,
    max_payload_bytes: usize,
    shutdown: F,
) -> AppResult<()>
where
    B: AnalysisBackend,
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    info!(addr = %addr, "Gateway listening");

    axum::serve(listener, router(gateway, max_payload_bytes))
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("HTTP server stopped");
    Ok(())
}

/// Resolve on Ctrl-C.
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C; shutting down");
    }
}
