//! Analysis backend abstraction.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{Deadline, DownstreamError};

/// Decoded answer of the analysis service.
///
/// Missing fields fall back to zero / empty rather than failing the decode.
/// The `score` and `entities` spellings used by the reference analysis
/// service are accepted as aliases.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReply {
    /// Risk score, copied into the result without range checks.
    #[serde(default, alias = "score")]
    pub risk_score: i64,
    /// Extracted keywords, order preserved.
    #[serde(default, alias = "entities", deserialize_with = "null_as_empty")]
    pub keywords: Vec<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// One request/response exchange with the external analysis service.
///
/// Implementations perform the call and report what went wrong; they do not
/// need to enforce the deadline themselves. The
/// [`DownstreamClient`](super::DownstreamClient) races every call against its
/// deadline and normalizes failures into sentinel results. The deadline is
/// passed along so transports can forward it (e.g. as a request timeout).
///
/// # Example
///
/// ```rust,ignore
/// use async_trait::async_trait;
/// use patentpulse_gateway::core::{AnalysisBackend, AnalysisReply, Deadline, DownstreamError};
///
/// #[derive(Clone)]
/// struct FixedScore;
///
/// #[async_trait]
/// impl AnalysisBackend for FixedScore {
///     async fn analyze(&self, _content: &[u8], _deadline: Deadline) -> Result<AnalysisReply, DownstreamError> {
///         Ok(AnalysisReply { risk_score: 42, keywords: vec!["patent".into()] })
///     }
/// }
/// ```
#[async_trait]
pub trait AnalysisBackend: Send + Sync + Clone + 'static {
    /// Analyse `content` and return the service's reply.
    ///
    /// # Errors
    ///
    /// Returns a [`DownstreamError`] describing the failure kind.
    async fn analyze(
        &self,
        content: &[u8],
        deadline: Deadline,
    ) -> Result<AnalysisReply, DownstreamError>;
}
