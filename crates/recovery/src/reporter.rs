//! Failure reporting sinks
//!
//! Reporting is fire-and-forget: the trait is infallible and implementations
//! swallow their own failures, logging them locally. A broken reporter must
//! never change the outcome of the retried operation.

use async_trait::async_trait;
use fetchguard_core::{ErrorContext, ErrorReport};
use std::collections::VecDeque;
use std::sync::Mutex;
use tracing::warn;

/// Sink for per-attempt failure records.
#[async_trait]
pub trait ErrorReporter: Send + Sync {
    async fn report_error(&self, context: &ErrorContext, report: &ErrorReport);
}

/// Default sink: structured tracing events.
pub struct TracingReporter;

#[async_trait]
impl ErrorReporter for TracingReporter {
    async fn report_error(&self, context: &ErrorContext, report: &ErrorReport) {
        warn!(
            operation = context.operation_name(),
            service = context.service_name(),
            attempt = report.attempt,
            reason = %report.reason,
            delay_ms = report.delay_ms,
            error = %report.error,
            "operation attempt failed"
        );
    }
}

/// Bounded in-memory sink, mostly for tests and diagnostics endpoints.
/// Oldest reports are dropped once `capacity` is reached.
pub struct MemoryReporter {
    reports: Mutex<VecDeque<ErrorReport>>,
    capacity: usize,
}

impl MemoryReporter {
    pub fn new(capacity: usize) -> Self {
        Self {
            reports: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    pub fn reports(&self) -> Vec<ErrorReport> {
        match self.reports.lock() {
            Ok(reports) => reports.iter().cloned().collect(),
            Err(poisoned) => poisoned.into_inner().iter().cloned().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.reports
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ErrorReporter for MemoryReporter {
    async fn report_error(&self, _context: &ErrorContext, report: &ErrorReport) {
        let mut reports = match self.reports.lock() {
            Ok(reports) => reports,
            Err(poisoned) => poisoned.into_inner(),
        };
        if reports.len() == self.capacity {
            reports.pop_front();
        }
        reports.push_back(report.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fetchguard_core::RetryReason;
    use std::time::Duration;

    fn report(attempt: u32) -> (ErrorContext, ErrorReport) {
        let ctx = ErrorContext::new("fetch_video", "download");
        let report = ErrorReport::new(
            &ctx,
            attempt,
            RetryReason::NetworkError,
            Some(Duration::from_millis(100)),
            &"timeout",
        );
        (ctx, report)
    }

    #[tokio::test]
    async fn memory_reporter_collects_reports() {
        let reporter = MemoryReporter::new(10);
        let (ctx, r) = report(1);
        reporter.report_error(&ctx, &r).await;
        let (ctx, r) = report(2);
        reporter.report_error(&ctx, &r).await;

        let reports = reporter.reports();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].attempt, 1);
        assert_eq!(reports[1].attempt, 2);
    }

    #[tokio::test]
    async fn memory_reporter_is_bounded() {
        let reporter = MemoryReporter::new(3);
        for attempt in 1..=9 {
            let (ctx, r) = report(attempt);
            reporter.report_error(&ctx, &r).await;
        }
        let reports = reporter.reports();
        assert_eq!(reports.len(), 3);
        assert_eq!(reports[0].attempt, 7, "oldest reports are dropped first");
    }
}
