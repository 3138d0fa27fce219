//! Deadline enforcement and failure normalization around an analysis backend.

use tracing::{debug, warn};

use super::{AnalysisBackend, AnalysisReply, AnalysisResult, Deadline, DownstreamError, JobState};

/// Outcome of one downstream call, already normalized into a result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownstreamOutcome {
    /// Terminal state reached by the job.
    pub state: JobState,
    /// Result to deliver to the caller.
    pub result: AnalysisResult,
}

/// Client issuing exactly one analysis call per job.
///
/// Never fails: every error path ends in a sentinel [`AnalysisResult`].
#[derive(Debug, Clone)]
pub struct DownstreamClient<B> {
    backend: B,
}

impl<B: AnalysisBackend> DownstreamClient<B> {
    /// Wrap a backend.
    pub const fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Access the wrapped backend.
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Analyse `content` for `job_id`, abandoning the call when `deadline`
    /// expires.
    pub async fn analyze(&self, job_id: &str, content: &[u8], deadline: Deadline) -> DownstreamOutcome {
        let outcome = deadline
            .run(self.backend.analyze(content, deadline))
            .await
            .unwrap_or(Err(DownstreamError::DeadlineExceeded {
                budget: deadline.budget(),
            }));
        normalize(job_id, outcome)
    }
}

/// Map a backend outcome onto the result shape delivered to callers.
pub(crate) fn normalize(
    job_id: &str,
    outcome: Result<AnalysisReply, DownstreamError>,
) -> DownstreamOutcome {
    match outcome {
        Ok(reply) => {
            debug!(job_id = job_id, risk_score = reply.risk_score, "Analysis completed");
            DownstreamOutcome {
                state: JobState::Completed,
                result: AnalysisResult::completed(job_id, reply.risk_score, reply.keywords),
            }
        }
        Err(err) => {
            let state = if err.is_timeout() {
                JobState::TimedOut
            } else {
                JobState::Failed
            };
            warn!(job_id = job_id, state = %state, error = %err, "Analysis failed");
            DownstreamOutcome {
                state,
                result: AnalysisResult::failed(job_id, err.to_string()),
            }
        }
    }
}
