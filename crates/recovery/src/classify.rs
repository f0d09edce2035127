//! Default mapping from errors to retry reasons.
//!
//! Used for every failed attempt; registered `ServiceErrorHandler`s refine
//! the terminal/non-terminal decision on top of this, they do not replace it.

use fetchguard_core::error::{NetworkError, QuotaError};
use fetchguard_core::{Error, RetryReason};

/// Classify an error for retry purposes.
pub fn classify(error: &Error) -> RetryReason {
    match error {
        Error::Network(e) => classify_network(e),
        Error::Quota(QuotaError::RateLimited { .. }) => RetryReason::RateLimited,
        Error::Quota(QuotaError::QuotaExceeded { .. }) => RetryReason::ApiQuotaExceeded,
        Error::Content(_) => RetryReason::QualityNotAvailable,
        Error::Io(_) => RetryReason::NetworkError,
        Error::Cancelled => RetryReason::Cancelled,
        Error::CircuitOpen { .. } => RetryReason::ServiceUnavailable,
        Error::Storage(_)
        | Error::Config(_)
        | Error::Serialization(_)
        | Error::UrlParse(_)
        | Error::Internal(_) => RetryReason::Unknown,
    }
}

fn classify_network(error: &NetworkError) -> RetryReason {
    match error.status() {
        Some(429) => return RetryReason::RateLimited,
        Some(503) => return RetryReason::ServiceUnavailable,
        _ => {}
    }
    match error {
        NetworkError::ServiceUnavailable { .. } => RetryReason::ServiceUnavailable,
        _ if error.is_recoverable() || error.is_temporary() => RetryReason::NetworkError,
        _ => RetryReason::Unknown,
    }
}
