//! Tests for configuration validation and loading

use patentpulse_gateway::config::GatewayConfig;
use std::collections::HashMap;
use std::time::Duration;

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn test_defaults() {
    let config = GatewayConfig::default();
    assert_eq!(config.queue_capacity, 10);
    assert_eq!(config.worker_count, 3);
    assert_eq!(config.admission_wait_timeout(), Duration::from_secs(2));
    assert_eq!(config.downstream_deadline(), Duration::from_secs(5));
    assert_eq!(config.max_payload_bytes, 10 * 1024 * 1024);
    assert_eq!(config.collaborator_endpoint, "http://localhost:5000/analyze");
    assert_eq!(config.listen_addr, "0.0.0.0:8080");
    assert!(config.validate().is_ok());
}

#[test]
fn test_builder_setters() {
    let config = GatewayConfig::new()
        .with_queue_capacity(4)
        .with_worker_count(1)
        .with_admission_wait_timeout(Duration::from_millis(250))
        .with_downstream_deadline(Duration::from_millis(750))
        .with_max_payload_bytes(2048)
        .with_collaborator_endpoint("https://analysis.internal/analyze")
        .with_listen_addr("127.0.0.1:9000");
    assert_eq!(config.queue_capacity, 4);
    assert_eq!(config.worker_count, 1);
    assert_eq!(config.admission_wait_timeout_ms, 250);
    assert_eq!(config.downstream_deadline_ms, 750);
    assert_eq!(config.max_payload_bytes, 2048);
    assert!(config.validate().is_ok());
}

#[test]
fn test_zero_values_invalid() {
    assert!(GatewayConfig::new().with_queue_capacity(0).validate().is_err());
    assert!(GatewayConfig::new().with_worker_count(0).validate().is_err());
    assert!(GatewayConfig::new()
        .with_admission_wait_timeout(Duration::ZERO)
        .validate()
        .is_err());
    assert!(GatewayConfig::new()
        .with_downstream_deadline(Duration::ZERO)
        .validate()
        .is_err());
    assert!(GatewayConfig::new().with_max_payload_bytes(0).validate().is_err());
}

#[test]
fn test_invalid_endpoint_and_listen_addr() {
    let err = GatewayConfig::new()
        .with_collaborator_endpoint("not a url")
        .validate()
        .unwrap_err();
    assert!(err.contains("collaborator_endpoint"));

    let err = GatewayConfig::new().with_listen_addr("localhost").validate().unwrap_err();
    assert!(err.contains("listen_addr"));
}

#[test]
fn test_from_json_str_partial() {
    let config = GatewayConfig::from_json_str(r#"{"worker_count": 5, "downstream_deadline_ms": 1500}"#).unwrap();
    assert_eq!(config.worker_count, 5);
    assert_eq!(config.downstream_deadline(), Duration::from_millis(1500));
    assert_eq!(config.queue_capacity, 10);
}

#[test]
fn test_from_json_str_rejects_invalid() {
    assert!(GatewayConfig::from_json_str("{ not json").unwrap_err().starts_with("parse error"));
    assert!(GatewayConfig::from_json_str(r#"{"queue_capacity": 0}"#).is_err());
}

#[test]
fn test_from_lookup_reads_prefixed_vars() {
    let config = GatewayConfig::from_lookup(lookup(&[
        ("PATENTPULSE_QUEUE_CAPACITY", "20"),
        ("PATENTPULSE_WORKER_COUNT", " 6 "),
        ("PATENTPULSE_ADMISSION_WAIT_MS", "500"),
        ("PATENTPULSE_DOWNSTREAM_DEADLINE_MS", "8000"),
        ("PATENTPULSE_MAX_PAYLOAD_BYTES", "1048576"),
        ("PATENTPULSE_COLLABORATOR_URL", "http://10.0.0.5:5000/analyze"),
        ("PATENTPULSE_LISTEN_ADDR", "127.0.0.1:8081"),
        ("QUEUE_CAPACITY", "99"),
    ]))
    .unwrap();

    assert_eq!(config.queue_capacity, 20);
    assert_eq!(config.worker_count, 6);
    assert_eq!(config.admission_wait_timeout(), Duration::from_millis(500));
    assert_eq!(config.downstream_deadline(), Duration::from_secs(8));
    assert_eq!(config.max_payload_bytes, 1 << 20);
    assert_eq!(config.collaborator_endpoint, "http://10.0.0.5:5000/analyze");
    assert_eq!(config.listen_addr, "127.0.0.1:8081");
}

#[test]
fn test_from_lookup_empty_is_default() {
    let config = GatewayConfig::from_lookup(|_| None).unwrap();
    assert_eq!(config, GatewayConfig::default());
}

#[test]
fn test_from_lookup_names_bad_variable() {
    let err = GatewayConfig::from_lookup(lookup(&[("PATENTPULSE_WORKER_COUNT", "three")])).unwrap_err();
    assert!(err.starts_with("PATENTPULSE_WORKER_COUNT=`three` invalid"), "{err}");

    let err = GatewayConfig::from_lookup(lookup(&[("PATENTPULSE_WORKER_COUNT", "0")])).unwrap_err();
    assert!(err.contains("worker_count"), "{err}");
}
