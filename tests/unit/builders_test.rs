//! Tests for builder modules

use async_trait::async_trait;
use patentpulse_gateway::builders::{build_gateway, build_http_gateway};
use patentpulse_gateway::config::GatewayConfig;
use patentpulse_gateway::core::{AnalysisBackend, AnalysisReply, Deadline, DownstreamError, GatewayError};
use std::time::Duration;

#[derive(Clone, Debug)]
struct FixedScore;

#[async_trait]
impl AnalysisBackend for FixedScore {
    async fn analyze(&self, _content: &[u8], _deadline: Deadline) -> Result<AnalysisReply, DownstreamError> {
        Ok(AnalysisReply {
            risk_score: 42,
            keywords: vec!["patent".into()],
        })
    }
}

#[test]
fn test_build_gateway_reports_configured_shape() {
    let config = GatewayConfig::new().with_worker_count(2).with_queue_capacity(5);
    let gateway = build_gateway(&config, FixedScore).unwrap();

    let stats = gateway.stats();
    assert_eq!(stats.worker_count, 2);
    assert_eq!(stats.queue_capacity, 5);
    assert_eq!(stats.queued_jobs, 0);
    assert_eq!(stats.submitted_jobs, 0);
    assert_eq!(gateway.admission().wait(), Duration::from_secs(2));

    gateway.shutdown();
}

#[test]
fn test_build_gateway_rejects_invalid_config() {
    let config = GatewayConfig::new().with_queue_capacity(0);
    let err = build_gateway(&config, FixedScore).unwrap_err();
    assert!(matches!(err, GatewayError::InvalidConfig(ref msg) if msg.contains("queue_capacity")));
}

#[test]
fn test_build_http_gateway_rejects_bad_endpoint() {
    let config = GatewayConfig::new().with_collaborator_endpoint("ftp://analysis.local/analyze");
    let err = build_http_gateway(&config).unwrap_err();
    assert!(matches!(err, GatewayError::InvalidConfig(ref msg) if msg.contains("http or https")));
}
