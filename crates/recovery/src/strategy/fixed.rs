use super::{bounded_jitter, retry_allowed, server_hint, RetryStrategy};
use fetchguard_core::error::ConfigError;
use fetchguard_core::{Error, RetryConfig, RetryReason};
use std::time::Duration;

/// Fraction by which the constant delay may be perturbed when jitter is on.
const JITTER_FRACTION: f64 = 0.1;

/// Waits a constant `base_delay` between attempts.
///
/// The simplest strategy; suitable for dependencies where backing off
/// harder buys nothing (e.g. local storage retries).
pub struct FixedDelayStrategy {
    config: RetryConfig,
}

impl FixedDelayStrategy {
    pub fn new(config: RetryConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            config: config.validated()?,
        })
    }
}

impl RetryStrategy for FixedDelayStrategy {
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
        _attempt: u32,
        error: &Error,
        _reason: RetryReason,
        config: &RetryConfig,
    ) -> Duration {
        let mut delay = config.base_delay;
        if let Some(hint) = server_hint(error) {
            delay = delay.max(hint);
        }
        if config.jitter {
            delay = bounded_jitter(delay, JITTER_FRACTION);
        }
        delay.min(config.max_delay)
    }

    fn record_success(&self) {}

    fn record_failure(&self, _reason: RetryReason) {}

    fn bound_config(&self) -> &RetryConfig {
        &self.config
    }

    fn name(&self) -> &'static str {
        "fixed_delay"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fetchguard_core::error::NetworkError;

    fn config() -> RetryConfig {
        RetryConfig {
            max_attempts: 3,
            base_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(1),
            jitter: false,
            ..Default::default()
        }
    }

    #[test]
    fn invalid_config_is_rejected_at_construction() {
        let bad = RetryConfig {
            base_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(1),
            ..Default::default()
        };
        assert!(FixedDelayStrategy::new(bad).is_err());
    }

    #[test]
    fn delay_is_constant_across_attempts() {
        let strategy = FixedDelayStrategy::new(config()).unwrap();
        let err: Error = NetworkError::Timeout.into();
        let cfg = config();
        let d1 = strategy.backoff_delay(1, &err, RetryReason::NetworkError, &cfg);
        let d3 = strategy.backoff_delay(3, &err, RetryReason::NetworkError, &cfg);
        assert_eq!(d1, Duration::from_millis(200));
        assert_eq!(d1, d3);
    }

    #[test]
    fn retries_until_attempts_exhausted() {
        let strategy = FixedDelayStrategy::new(config()).unwrap();
        let err: Error = NetworkError::Timeout.into();
        let cfg = config();
        assert!(strategy.should_retry(1, &err, RetryReason::NetworkError, &cfg));
        assert!(strategy.should_retry(2, &err, RetryReason::NetworkError, &cfg));
        assert!(!strategy.should_retry(3, &err, RetryReason::NetworkError, &cfg));
    }

    #[test]
    fn server_hint_raises_the_delay() {
        let strategy = FixedDelayStrategy::new(config()).unwrap();
        let err: Error = fetchguard_core::error::QuotaError::rate_limited(Some(1)).into();
        let cfg = config();
        let d = strategy.backoff_delay(1, &err, RetryReason::RateLimited, &cfg);
        assert_eq!(d, Duration::from_secs(1));
    }

    #[test]
    fn jittered_delay_stays_bounded() {
        let mut cfg = config();
        cfg.jitter = true;
        let strategy = FixedDelayStrategy::new(cfg.clone()).unwrap();
        let err: Error = NetworkError::Timeout.into();
        for _ in 0..50 {
            let d = strategy.backoff_delay(1, &err, RetryReason::NetworkError, &cfg);
            assert!(d >= Duration::from_millis(179));
            assert!(d <= Duration::from_millis(221));
        }
    }
}
