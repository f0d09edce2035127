use super::{exponential_delay, full_jitter, retry_allowed, server_hint, RetryStrategy};
use fetchguard_core::error::ConfigError;
use fetchguard_core::{Error, RetryConfig, RetryReason};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;

/// Multiplier on the exponential base while the window looks unhealthy.
const DEGRADED_BASE_MULTIPLIER: f64 = 2.0;

/// Ring of the most recent outcomes; capacity equals `window_size` and
/// never grows with call volume.
#[derive(Debug)]
struct OutcomeWindow {
    outcomes: VecDeque<bool>,
    capacity: usize,
}

impl OutcomeWindow {
    fn new(capacity: usize) -> Self {
        Self {
            outcomes: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    fn push(&mut self, success: bool) {
        if self.outcomes.len() == self.capacity {
            self.outcomes.pop_front();
        }
        self.outcomes.push_back(success);
    }

    /// 1.0 for the empty window: an untested dependency is presumed healthy.
    fn success_rate(&self) -> f64 {
        if self.outcomes.is_empty() {
            return 1.0;
        }
        let successes = self.outcomes.iter().filter(|s| **s).count();
        successes as f64 / self.outcomes.len() as f64
    }

    fn len(&self) -> usize {
        self.outcomes.len()
    }
}

/// Backs off according to the dependency's recent health.
///
/// While the rolling success rate over the last `window_size` outcomes stays
/// at or above `success_threshold`, retries wait only `base_delay`. Below
/// it, delays switch to exponential backoff with an amplified base.
pub struct AdaptiveStrategy {
    config: RetryConfig,
    window: Mutex<OutcomeWindow>,
}

impl AdaptiveStrategy {
    pub fn new(config: RetryConfig) -> Result<Self, ConfigError> {
        let config = config.validated()?;
        let window = Mutex::new(OutcomeWindow::new(config.window_size));
        Ok(Self { config, window })
    }

    /// Rolling success rate over the current window.
    pub fn success_rate(&self) -> f64 {
        self.lock().success_rate()
    }

    /// Number of outcomes currently remembered.
    pub fn window_len(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, OutcomeWindow> {
        self.window.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl RetryStrategy for AdaptiveStrategy {
    fn should_retry(
        &self,
        attempt: u32,
        _error: &Error,
        reason: RetryReason,
        config: &RetryConfig,
    ) -> bool {
        retry_allowed(attempt, reason, config)
    }

    fn backoff_delay(
        &self,
        attempt: u32,
        error: &Error,
        _reason: RetryReason,
        config: &RetryConfig,
    ) -> Duration {
        let rate = self.success_rate();
        let mut delay = if rate < config.success_threshold {
            debug!(success_rate = rate, "window degraded, amplifying backoff");
            exponential_delay(
                attempt,
                config.base_delay,
                config.exponential_base * DEGRADED_BASE_MULTIPLIER,
                config.max_delay,
            )
        } else {
            config.base_delay
        };
        if let Some(hint) = server_hint(error) {
            delay = delay.max(hint).min(config.max_delay);
        }
        if config.jitter {
            delay = full_jitter(delay);
        }
        delay
    }

    fn record_success(&self) {
        self.lock().push(true);
    }

    fn record_failure(&self, reason: RetryReason) {
        if !reason.counts_as_failure() {
            return;
        }
        self.lock().push(false);
    }

    fn bound_config(&self) -> &RetryConfig {
        &self.config
    }

    fn name(&self) -> &'static str {
        "adaptive"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fetchguard_core::error::NetworkError;

    fn config(window_size: usize, success_threshold: f64) -> RetryConfig {
        RetryConfig {
            window_size,
            success_threshold,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            jitter: false,
            exponential_base: 2.0,
            ..Default::default()
        }
    }

    #[test]
    fn empty_window_counts_as_healthy() {
        let strategy = AdaptiveStrategy::new(config(10, 0.5)).unwrap();
        assert_eq!(strategy.success_rate(), 1.0);
        assert_eq!(strategy.window_len(), 0);
    }

    #[test]
    fn window_never_exceeds_capacity() {
        let strategy = AdaptiveStrategy::new(config(5, 0.5)).unwrap();
        for _ in 0..5 + 37 {
            strategy.record_failure(RetryReason::NetworkError);
        }
        assert_eq!(strategy.window_len(), 5);
    }

    #[test]
    fn eviction_drops_the_oldest_outcome() {
        let strategy = AdaptiveStrategy::new(config(3, 0.5)).unwrap();
        strategy.record_failure(RetryReason::NetworkError);
        strategy.record_success();
        strategy.record_success();
        // Window is [F, S, S]; the next success evicts the failure.
        strategy.record_success();
        assert_eq!(strategy.success_rate(), 1.0);
    }

    #[test]
    fn healthy_window_uses_minimal_delay() {
        let cfg = config(10, 0.5);
        let strategy = AdaptiveStrategy::new(cfg.clone()).unwrap();
        for _ in 0..10 {
            strategy.record_success();
        }
        let err: Error = NetworkError::Timeout.into();
        let d = strategy.backoff_delay(4, &err, RetryReason::NetworkError, &cfg);
        assert_eq!(d, Duration::from_millis(100));
    }

    #[test]
    fn degraded_window_amplifies_backoff() {
        let cfg = config(10, 0.5);
        let strategy = AdaptiveStrategy::new(cfg.clone()).unwrap();
        for _ in 0..8 {
            strategy.record_failure(RetryReason::NetworkError);
        }
        strategy.record_success();
        strategy.record_success();
        assert!(strategy.success_rate() < 0.5);

        let err: Error = NetworkError::Timeout.into();
        // Base 2.0 amplified to 4.0: attempt 3 waits 100ms * 16.
        let d = strategy.backoff_delay(3, &err, RetryReason::NetworkError, &cfg);
        assert_eq!(d, Duration::from_millis(1600));
        assert!(
            strategy.backoff_delay(10, &err, RetryReason::NetworkError, &cfg) <= cfg.max_delay
        );
    }

    #[test]
    fn cancellation_is_not_an_outcome() {
        let strategy = AdaptiveStrategy::new(config(5, 0.5)).unwrap();
        strategy.record_failure(RetryReason::Cancelled);
        assert_eq!(strategy.window_len(), 0);
    }

    #[test]
    fn zero_window_size_is_rejected() {
        let bad = RetryConfig {
            window_size: 0,
            ..Default::default()
        };
        assert!(AdaptiveStrategy::new(bad).is_err());
    }
}
