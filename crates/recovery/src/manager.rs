//! Central recovery executor
//!
//! `ErrorRecoveryManager` composes one retry strategy, one reporter and the
//! registered per-domain handlers, and exposes `execute_with_retry`: the
//! single entry point the orchestrator uses to run an unreliable operation
//! to completion. Downstream services must not retry internally; the
//! manager is the one place in the call chain that loops.

use crate::classify::classify;
use crate::handler::ServiceErrorHandler;
use crate::reporter::{ErrorReporter, TracingReporter};
use crate::strategy::RetryStrategy;
use fetchguard_core::error::ConfigError;
use fetchguard_core::{Error, ErrorContext, ErrorReport, Result, RetryConfig};
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

const DEFAULT_IN_FLIGHT_CAPACITY: usize = 1024;

#[derive(Debug)]
struct InFlightEntry {
    started_at: Instant,
    attempts: AtomicU32,
}

/// Snapshot row from the in-flight registry.
#[derive(Debug, Clone)]
pub struct InFlightOperation {
    pub key: String,
    pub attempts: u32,
    pub elapsed: Duration,
}

/// Bounded registry of operations currently inside `execute_with_retry`.
/// Entries live for the duration of one call and are removed on completion,
/// success or failure alike. Tracking is best-effort: at capacity (or on a
/// key collision) the call still runs, just unlisted.
struct InFlightRegistry {
    entries: Mutex<HashMap<String, Arc<InFlightEntry>>>,
    capacity: usize,
}

impl InFlightRegistry {
    fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            capacity,
        }
    }

    fn register(&self, key: String) -> InFlightGuard<'_> {
        let mut entries = self.lock();
        let entry = if entries.len() >= self.capacity || entries.contains_key(&key) {
            trace!(key = %key, "in-flight registry not tracking this call");
            None
        } else {
            let entry = Arc::new(InFlightEntry {
                started_at: Instant::now(),
                attempts: AtomicU32::new(1),
            });
            entries.insert(key.clone(), entry.clone());
            Some(entry)
        };
        drop(entries);
        InFlightGuard {
            registry: self,
            key,
            entry,
        }
    }

    fn snapshot(&self) -> Vec<InFlightOperation> {
        self.lock()
            .iter()
            .map(|(key, entry)| InFlightOperation {
                key: key.clone(),
                attempts: entry.attempts.load(Ordering::Relaxed),
                elapsed: entry.started_at.elapsed(),
            })
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Arc<InFlightEntry>>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

struct InFlightGuard<'a> {
    registry: &'a InFlightRegistry,
    key: String,
    entry: Option<Arc<InFlightEntry>>,
}

impl InFlightGuard<'_> {
    fn bump(&self, attempt: u32) {
        if let Some(entry) = &self.entry {
            entry.attempts.store(attempt, Ordering::Relaxed);
        }
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if self.entry.is_some() {
            self.registry.lock().remove(&self.key);
        }
    }
}

/// Composes a strategy, a reporter and per-domain handlers into the retry
/// executor used by the orchestrator.
pub struct ErrorRecoveryManager {
    strategy: Arc<dyn RetryStrategy>,
    reporter: Arc<dyn ErrorReporter>,
    handlers: HashMap<String, Arc<dyn ServiceErrorHandler>>,
    in_flight: InFlightRegistry,
    shutdown: CancellationToken,
}

impl ErrorRecoveryManager {
    pub fn builder() -> ErrorRecoveryManagerBuilder {
        ErrorRecoveryManagerBuilder::new()
    }

    /// Run `operation` to success or final failure, waiting between attempts
    /// according to the strategy's bound configuration.
    pub async fn execute_with_retry<T, F, Fut>(
        &self,
        operation: F,
        context: &ErrorContext,
    ) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.execute_with_options(operation, context, None, self.shutdown.child_token())
            .await
    }

    /// Like `execute_with_retry`, with an explicit per-call config override.
    pub async fn execute_with_config<T, F, Fut>(
        &self,
        operation: F,
        context: &ErrorContext,
        config: Option<RetryConfig>,
    ) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.execute_with_options(operation, context, config, self.shutdown.child_token())
            .await
    }

    /// Full form: optional config override and a caller-owned cancellation
    /// token. Cancellation aborts the inter-attempt wait promptly, never
    /// starts another attempt, and is not counted as a strategy failure.
    pub async fn execute_with_options<T, F, Fut>(
        &self,
        mut operation: F,
        context: &ErrorContext,
        config: Option<RetryConfig>,
        cancel: CancellationToken,
    ) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        // The caller's override wins; otherwise the strategy's own bound
        // config governs the call.
        let config = match config {
            Some(config) => config.validated().map_err(Error::from)?,
            None => self.strategy.bound_config().clone(),
        };

        let guard = self.in_flight.register(context.operation_key());
        let handler = self.handlers.get(context.service_name());
        let mut attempt: u32 = 1;

        loop {
            guard.bump(attempt);

            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            if !self.strategy.admit() {
                debug!(
                    operation = context.operation_name(),
                    service = context.service_name(),
                    "attempt rejected by strategy"
                );
                return Err(Error::circuit_open(context.service_name()));
            }

            debug!(
                operation = context.operation_name(),
                service = context.service_name(),
                attempt,
                max_attempts = config.max_attempts,
                "executing operation"
            );

            let error = match operation().await {
                Ok(value) => {
                    self.strategy.record_success();
                    trace!(
                        operation = context.operation_name(),
                        attempt,
                        "operation succeeded"
                    );
                    return Ok(value);
                }
                Err(error) => error,
            };

            if matches!(error, Error::Cancelled) {
                self.strategy.record_cancelled();
                return Err(error);
            }

            let reason = classify(&error);
            self.strategy.record_failure(reason);

            if let Some(handler) = handler {
                if handler.handle_error(&error, context) {
                    let report = ErrorReport::new(context, attempt, reason, None, &error);
                    self.reporter.report_error(context, &report).await;
                    for hint in handler.recovery_suggestions(&error) {
                        debug!(
                            operation = context.operation_name(),
                            domain = handler.domain(),
                            hint = %hint,
                            "recovery suggestion"
                        );
                    }
                    return Err(error);
                }
            }

            if !self.strategy.should_retry(attempt, &error, reason, &config) {
                warn!(
                    operation = context.operation_name(),
                    service = context.service_name(),
                    attempt,
                    reason = %reason,
                    "giving up"
                );
                let report = ErrorReport::new(context, attempt, reason, None, &error);
                self.reporter.report_error(context, &report).await;
                return Err(error);
            }

            let delay = self.strategy.backoff_delay(attempt, &error, reason, &config);
            let report = ErrorReport::new(context, attempt, reason, Some(delay), &error);
            self.reporter.report_error(context, &report).await;

            debug!(
                operation = context.operation_name(),
                delay_ms = delay.as_millis() as u64,
                "waiting before retry"
            );
            tokio::select! {
                _ = cancel.cancelled() => {
                    self.strategy.record_cancelled();
                    return Err(Error::Cancelled);
                }
                _ = tokio::time::sleep(delay) => {}
            }
            attempt += 1;
        }
    }

    /// Operations currently being executed.
    pub fn in_flight(&self) -> Vec<InFlightOperation> {
        self.in_flight.snapshot()
    }

    /// The strategy shared by every call through this manager.
    pub fn strategy(&self) -> &Arc<dyn RetryStrategy> {
        &self.strategy
    }

    /// Cancel every in-flight wait started without a caller-owned token.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

/// Builder for `ErrorRecoveryManager`. The strategy is required; the
/// reporter defaults to `TracingReporter`.
pub struct ErrorRecoveryManagerBuilder {
    strategy: Option<Arc<dyn RetryStrategy>>,
    reporter: Option<Arc<dyn ErrorReporter>>,
    handlers: HashMap<String, Arc<dyn ServiceErrorHandler>>,
    in_flight_capacity: usize,
}

impl ErrorRecoveryManagerBuilder {
    fn new() -> Self {
        Self {
            strategy: None,
            reporter: None,
            handlers: HashMap::new(),
            in_flight_capacity: DEFAULT_IN_FLIGHT_CAPACITY,
        }
    }

    pub fn strategy(mut self, strategy: Arc<dyn RetryStrategy>) -> Self {
        self.strategy = Some(strategy);
        self
    }

    pub fn reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Register the handler consulted for operations against `service`.
    pub fn handler(
        mut self,
        service: impl Into<String>,
        handler: Arc<dyn ServiceErrorHandler>,
    ) -> Self {
        self.handlers.insert(service.into(), handler);
        self
    }

    pub fn in_flight_capacity(mut self, capacity: usize) -> Self {
        self.in_flight_capacity = capacity;
        self
    }

    pub fn build(self) -> Result<ErrorRecoveryManager> {
        let strategy = self
            .strategy
            .ok_or_else(|| ConfigError::missing_field("strategy"))?;
        Ok(ErrorRecoveryManager {
            strategy,
            reporter: self.reporter.unwrap_or_else(|| Arc::new(TracingReporter)),
            handlers: self.handlers,
            in_flight: InFlightRegistry::new(self.in_flight_capacity),
            shutdown: CancellationToken::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::MemoryReporter;
    use crate::strategy::ExponentialBackoffStrategy;
    use fetchguard_core::error::NetworkError;
    use std::sync::atomic::AtomicUsize;

    fn fast_config() -> RetryConfig {
        RetryConfig {
            max_attempts: 3,
            base_delay: Duration::from_millis(5),
            max_delay: Duration::from_millis(50),
            jitter: false,
            ..Default::default()
        }
    }

    fn manager(config: RetryConfig) -> (ErrorRecoveryManager, Arc<MemoryReporter>) {
        let reporter = Arc::new(MemoryReporter::new(100));
        let manager = ErrorRecoveryManager::builder()
            .strategy(Arc::new(ExponentialBackoffStrategy::new(config).unwrap()))
            .reporter(reporter.clone())
            .build()
            .unwrap();
        (manager, reporter)
    }

    #[test]
    fn builder_requires_a_strategy() {
        assert!(ErrorRecoveryManager::builder().build().is_err());
    }

    #[tokio::test]
    async fn first_attempt_success_reports_nothing() {
        let (manager, reporter) = manager(fast_config());
        let ctx = ErrorContext::new("fetch_video", "download");
        let result = manager
            .execute_with_retry(|| async { Ok::<_, Error>(7) }, &ctx)
            .await
            .unwrap();
        assert_eq!(result, 7);
        assert!(reporter.is_empty());
    }

    #[tokio::test]
    async fn override_config_governs_attempt_count() {
        let (manager, reporter) = manager(fast_config());
        let ctx = ErrorContext::new("fetch_video", "download");
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();

        let tight = RetryConfig {
            max_attempts: 1,
            ..fast_config()
        };
        let result: Result<()> = manager
            .execute_with_config(
                || {
                    let calls = calls_clone.clone();
                    async move {
                        calls.fetch_add(1, Ordering::Relaxed);
                        Err(NetworkError::Timeout.into())
                    }
                },
                &ctx,
                Some(tight),
            )
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::Relaxed), 1);
        assert_eq!(reporter.len(), 1);
    }

    #[tokio::test]
    async fn invalid_override_config_fails_before_any_attempt() {
        let (manager, _) = manager(fast_config());
        let ctx = ErrorContext::new("fetch_video", "download");
        let bad = RetryConfig {
            max_attempts: 0,
            ..Default::default()
        };
        let result: Result<()> = manager
            .execute_with_config(
                || async { panic!("operation must not run") },
                &ctx,
                Some(bad),
            )
            .await;
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn in_flight_registry_empties_after_completion() {
        let (manager, _) = manager(fast_config());
        let ctx = ErrorContext::new("fetch_video", "download");
        manager
            .execute_with_retry(|| async { Ok::<_, Error>(()) }, &ctx)
            .await
            .unwrap();
        assert!(manager.in_flight().is_empty());
    }

    #[tokio::test]
    async fn pre_cancelled_token_skips_the_operation() {
        let (manager, reporter) = manager(fast_config());
        let ctx = ErrorContext::new("fetch_video", "download");
        let token = CancellationToken::new();
        token.cancel();
        let result: Result<()> = manager
            .execute_with_options(
                || async { panic!("operation must not run") },
                &ctx,
                None,
                token,
            )
            .await;
        assert!(matches!(result, Err(Error::Cancelled)));
        assert!(reporter.is_empty());
    }
}
