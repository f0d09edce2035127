//! Common utilities for integration tests

use fetchguard_core::error::NetworkError;
use fetchguard_core::{Error, ErrorContext, Result, RetryConfig};
use fetchguard_recovery::{ErrorRecoveryManager, MemoryReporter, RetryStrategy};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// A scripted operation that fails a fixed number of times before
/// succeeding, counting every invocation.
pub struct FlakyOperation {
    calls: AtomicUsize,
    failures_before_success: usize,
}

impl FlakyOperation {
    pub fn new(failures_before_success: usize) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            failures_before_success,
        })
    }

    /// Always-failing variant.
    pub fn always_failing() -> Arc<Self> {
        Self::new(usize::MAX)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    pub async fn invoke(&self) -> Result<u64> {
        let call = self.calls.fetch_add(1, Ordering::Relaxed);
        if call < self.failures_before_success {
            Err(NetworkError::Timeout.into())
        } else {
            Ok(42)
        }
    }

    /// Like `invoke`, returning the given error on every failure.
    pub async fn invoke_with(&self, make_error: impl Fn() -> Error) -> Result<u64> {
        let call = self.calls.fetch_add(1, Ordering::Relaxed);
        if call < self.failures_before_success {
            Err(make_error())
        } else {
            Ok(42)
        }
    }
}

/// A retry config with delays short enough for tests.
pub fn fast_config(max_attempts: u32) -> RetryConfig {
    RetryConfig {
        max_attempts,
        base_delay: Duration::from_millis(10),
        max_delay: Duration::from_millis(100),
        jitter: false,
        ..Default::default()
    }
}

/// Manager wired to the given strategy and a memory reporter.
pub fn manager_with(
    strategy: Arc<dyn RetryStrategy>,
) -> (Arc<ErrorRecoveryManager>, Arc<MemoryReporter>) {
    let reporter = Arc::new(MemoryReporter::new(100));
    let manager = ErrorRecoveryManager::builder()
        .strategy(strategy)
        .reporter(reporter.clone())
        .build()
        .expect("manager must build");
    (Arc::new(manager), reporter)
}

/// Context for a download-domain operation.
pub fn download_context(item_id: &str) -> ErrorContext {
    ErrorContext::new("fetch_video", "download").with("item_id", item_id)
}
