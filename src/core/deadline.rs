//! Per-call deadline token.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

/// Time budget for exactly one downstream call.
///
/// A fresh token is derived for every job; it is consumed by the call it
/// guards and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    expires_at: Instant,
    budget: Duration,
}

impl Deadline {
    /// Deadline expiring `budget` from now.
    #[must_use]
    pub fn after(budget: Duration) -> Self {
        Self {
            expires_at: Instant::now() + budget,
            budget,
        }
    }

    /// Total budget granted when the token was created.
    #[must_use]
    pub const fn budget(&self) -> Duration {
        self.budget
    }

    /// Instant at which the call is abandoned.
    #[must_use]
    pub const fn expires_at(&self) -> Instant {
        self.expires_at
    }

    /// Time left before expiry, zero once expired.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }

    /// Whether the deadline has passed.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    /// Race `fut` against the deadline.
    ///
    /// On expiry the future is dropped, cancelling whatever it was doing,
    /// and `None` is returned.
    pub async fn run<F: Future>(self, fut: F) -> Option<F::Output> {
        tokio::time::timeout_at(self.expires_at, fut).await.ok()
    }
}
