//! Tests for error types

use patentpulse_gateway::core::{DownstreamError, GatewayError};
use std::time::Duration;

#[test]
fn test_busy_error() {
    let err = GatewayError::Busy {
        waited: Duration::from_secs(2),
    };
    assert_eq!(format!("{}", err), "server busy: job not admitted within 2000ms");
}

#[test]
fn test_shutdown_error() {
    assert_eq!(format!("{}", GatewayError::Shutdown), "gateway has been shut down");
}

#[test]
fn test_invalid_config_error() {
    let err = GatewayError::InvalidConfig("worker_count must be greater than 0".to_string());
    assert_eq!(
        format!("{}", err),
        "invalid configuration: worker_count must be greater than 0"
    );
}

#[test]
fn test_request_error() {
    let err = DownstreamError::Request("relative URL without a base".to_string());
    assert_eq!(
        format!("{}", err),
        "failed to create request: relative URL without a base"
    );
    assert!(!err.is_timeout());
}

#[test]
fn test_unreachable_error() {
    let err = DownstreamError::Unreachable("connection refused".to_string());
    assert_eq!(format!("{}", err), "analysis service unreachable: connection refused");
    assert!(!err.is_timeout());
}

#[test]
fn test_deadline_error() {
    let err = DownstreamError::DeadlineExceeded {
        budget: Duration::from_secs(5),
    };
    assert_eq!(
        format!("{}", err),
        "analysis service unreachable: deadline of 5000ms exceeded"
    );
    assert!(err.is_timeout());
}

#[test]
fn test_invalid_response_error() {
    let err = DownstreamError::InvalidResponse("expected value at line 1 column 1".to_string());
    assert_eq!(
        format!("{}", err),
        "invalid JSON from analysis service: expected value at line 1 column 1"
    );
}

#[test]
fn test_gateway_error_into_anyhow() {
    let err: anyhow::Error = GatewayError::Shutdown.into();
    assert!(err.downcast_ref::<GatewayError>().is_some());
}
