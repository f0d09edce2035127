use crate::models::context::ErrorContext;
use crate::models::reason::RetryReason;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

/// Record of one failed attempt, produced by the manager and handed to the
/// reporter. Write-once: constructed in full, never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
    pub operation_name: String,
    pub service_name: String,
    /// 1-based attempt number that failed.
    pub attempt: u32,
    pub timestamp: DateTime<Utc>,
    pub reason: RetryReason,
    /// Delay scheduled before the next attempt; `None` when the failure was
    /// final (terminal classification or exhausted attempts).
    pub delay_ms: Option<u64>,
    /// Display rendering of the original error.
    pub error: String,
}

impl ErrorReport {
    pub fn new(
        context: &ErrorContext,
        attempt: u32,
        reason: RetryReason,
        delay: Option<Duration>,
        error: &dyn std::fmt::Display,
    ) -> Self {
        Self {
            operation_name: context.operation_name().to_string(),
            service_name: context.service_name().to_string(),
            attempt,
            timestamp: Utc::now(),
            reason,
            delay_ms: delay.map(|d| d.as_millis() as u64),
            error: error.to_string(),
        }
    }
}
