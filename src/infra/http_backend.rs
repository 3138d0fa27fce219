//! HTTP transport to the external analysis service.

use std::borrow::Cow;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, warn};

use crate::core::{AnalysisBackend, AnalysisReply, Deadline, DownstreamError, GatewayError};

/// Request body sent to the analysis service.
#[derive(Debug, Serialize)]
struct AnalyzeRequest<'a> {
    content: Cow<'a, str>,
}

/// Analysis backend speaking JSON over HTTP.
///
/// Posts `{"content": ...}` to the configured endpoint and decodes
/// `{"risk_score": ..., "keywords": [...]}` from the response body.
#[derive(Debug, Clone)]
pub struct HttpAnalysisBackend {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpAnalysisBackend {
    /// Create a backend targeting `endpoint`.
    ///
    /// The endpoint is not checked here; an unusable URL surfaces as a
    /// request construction failure on every call.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::InvalidConfig` if the HTTP client cannot be
    /// initialized.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, GatewayError> {
        // Each worker drives calls from its own runtime, so idle connections
        // are not pooled across them.
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| GatewayError::InvalidConfig(format!("http client: {e}")))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// Endpoint every call is posted to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl AnalysisBackend for HttpAnalysisBackend {
    async fn analyze(
        &self,
        content: &[u8],
        deadline: Deadline,
    ) -> Result<AnalysisReply, DownstreamError> {
        let body = AnalyzeRequest {
            content: String::from_utf8_lossy(content),
        };
        let request = self
            .client
            .post(&self.endpoint)
            .timeout(deadline.remaining())
            .json(&body)
            .build()
            .map_err(|e| DownstreamError::Request(e.to_string()))?;

        let map_transport = |e: reqwest::Error| {
            if e.is_timeout() {
                DownstreamError::DeadlineExceeded {
                    budget: deadline.budget(),
                }
            } else {
                DownstreamError::Unreachable(e.to_string())
            }
        };

        let response = self.client.execute(request).await.map_err(map_transport)?;
        let status = response.status();
        if !status.is_success() {
            // Decodable bodies still count as results, whatever the status.
            warn!(status = %status, endpoint = %self.endpoint, "Analysis service returned error status");
        }

        let bytes = response.bytes().await.map_err(map_transport)?;
        debug!(status = %status, bytes = bytes.len(), "Analysis service responded");

        serde_json::from_slice(&bytes).map_err(|e| DownstreamError::InvalidResponse(e.to_string()))
    }
}
