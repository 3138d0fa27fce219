//! Tests for job records and the result sink

use patentpulse_gateway::core::{AnalysisResult, Job, JobQueue, JobState, SENTINEL_RISK_SCORE};

#[test]
fn test_job_ids_are_unique() {
    let (a, rx_a) = Job::new("a.pdf", b"a".to_vec());
    let (b, _rx_b) = Job::new("b.pdf", b"b".to_vec());
    assert_ne!(a.id, b.id);
    assert_eq!(rx_a.job_id(), a.id);
}

#[test]
fn test_result_travels_through_queue_to_receiver() {
    let queue = JobQueue::bounded(2);
    let (job, rx) = Job::new("claims.pdf", b"claims".to_vec());
    queue.try_push(job).unwrap();

    let job = queue.pop().unwrap();
    assert_eq!(job.filename, "claims.pdf");
    let delivered = job
        .sink
        .deliver(AnalysisResult::completed(job.id.clone(), 42, vec!["patent".into()]));
    assert!(delivered);

    let result = rx.blocking_recv().unwrap();
    assert_eq!(result.risk_score, 42);
    assert!(!result.is_sentinel());
}

#[test]
fn test_dropped_job_yields_no_result() {
    let (job, rx) = Job::new("claims.pdf", b"claims".to_vec());
    drop(job);
    assert!(rx.blocking_recv().is_none());
}

#[test]
fn test_sentinel_serialization() {
    let result = AnalysisResult::failed("job-1", "analysis service unreachable: connection refused");
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["risk_score"], SENTINEL_RISK_SCORE);
    assert_eq!(json["keywords"], serde_json::json!([]));
    assert_eq!(json["error"], "analysis service unreachable: connection refused");

    let ok = serde_json::to_value(AnalysisResult::completed("job-2", 7, vec![])).unwrap();
    assert!(ok.get("error").is_none());
}

#[test]
fn test_terminal_states() {
    assert!(!JobState::Queued.is_terminal());
    assert!(!JobState::AwaitingDownstream.is_terminal());
    assert!(JobState::Completed.is_terminal());
    assert!(JobState::TimedOut.is_terminal());
    assert!(JobState::Failed.is_terminal());
    assert_eq!(JobState::TimedOut.to_string(), "timed_out");
}
