use thiserror::Error;

/// Rate-limit and API-quota errors
#[derive(Error, Debug)]
pub enum QuotaError {
    #[error("Rate limit exceeded")]
    RateLimited { retry_after: Option<u64> },

    #[error("API quota exhausted: {quota}")]
    QuotaExceeded { quota: String },
}

impl QuotaError {
    pub fn rate_limited(retry_after: Option<u64>) -> Self {
        Self::RateLimited { retry_after }
    }

    pub fn quota_exceeded(quota: impl Into<String>) -> Self {
        Self::QuotaExceeded {
            quota: quota.into(),
        }
    }

    /// Server-suggested wait in seconds, when the response carried one.
    pub fn retry_after(&self) -> Option<u64> {
        match self {
            QuotaError::RateLimited { retry_after } => *retry_after,
            QuotaError::QuotaExceeded { .. } => None,
        }
    }

    /// Quota errors always clear eventually; retrying with enough backoff
    /// is legitimate.
    pub fn is_recoverable(&self) -> bool {
        true
    }
}
