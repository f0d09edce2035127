use serde::{Deserialize, Serialize};

/// Classification attached to every failed attempt.
///
/// Strategies key their decisions off this, not off concrete error types;
/// the mapping from errors to reasons lives in the recovery crate's
/// classifier and the per-domain handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryReason {
    /// Transport-level failure: timeout, reset, DNS, refused connection.
    NetworkError,
    /// The remote asked us to slow down (HTTP 429 or equivalent).
    RateLimited,
    /// A metered API quota is exhausted.
    ApiQuotaExceeded,
    /// The remote is up but refusing work (HTTP 503 or equivalent).
    ServiceUnavailable,
    /// The requested content/quality does not exist. Permanent.
    QualityNotAvailable,
    /// The call was cancelled from outside. Not a failure.
    Cancelled,
    /// Anything the classifier could not place.
    Unknown,
}

impl RetryReason {
    /// Permanent failures are never retried, no matter the strategy.
    pub fn is_permanent(&self) -> bool {
        matches!(self, RetryReason::QualityNotAvailable)
    }

    /// Whether this outcome feeds strategy failure accounting.
    ///
    /// Cancellation aborts the call without touching breaker counters or
    /// adaptive windows.
    pub fn counts_as_failure(&self) -> bool {
        !matches!(self, RetryReason::Cancelled)
    }

    /// Throttling reasons get amplified backoff.
    pub fn is_throttle(&self) -> bool {
        matches!(
            self,
            RetryReason::RateLimited | RetryReason::ApiQuotaExceeded
        )
    }
}

impl std::fmt::Display for RetryReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RetryReason::NetworkError => write!(f, "network_error"),
            RetryReason::RateLimited => write!(f, "rate_limited"),
            RetryReason::ApiQuotaExceeded => write!(f, "api_quota_exceeded"),
            RetryReason::ServiceUnavailable => write!(f, "service_unavailable"),
            RetryReason::QualityNotAvailable => write!(f, "quality_not_available"),
            RetryReason::Cancelled => write!(f, "cancelled"),
            RetryReason::Unknown => write!(f, "unknown"),
        }
    }
}
