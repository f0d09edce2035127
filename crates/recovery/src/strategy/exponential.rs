use super::{exponential_delay, full_jitter, retry_allowed, server_hint, RetryStrategy};
use fetchguard_core::error::ConfigError;
use fetchguard_core::{Error, RetryConfig, RetryReason};
use std::time::Duration;

/// Extra multiplier applied when the remote asked us to slow down.
const THROTTLE_MULTIPLIER: u32 = 2;

/// Exponential backoff: `base_delay * exponential_base^(attempt-1)`, capped
/// at `max_delay`.
///
/// Throttling failures (rate limits, exhausted quotas) are backed off twice
/// as hard, and a server-supplied Retry-After raises the floor. With jitter
/// enabled the delay is scaled by a uniform factor in [0, 1] so independent
/// callers do not retry in lockstep.
pub struct ExponentialBackoffStrategy {
    config: RetryConfig,
}

impl ExponentialBackoffStrategy {
    pub fn new(config: RetryConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            config: config.validated()?,
        })
    }
}

impl RetryStrategy for ExponentialBackoffStrategy {
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
        reason: RetryReason,
        config: &RetryConfig,
    ) -> Duration {
        let mut delay = exponential_delay(
            attempt,
            config.base_delay,
            config.exponential_base,
            config.max_delay,
        );
        if reason.is_throttle() {
            delay = delay
                .saturating_mul(THROTTLE_MULTIPLIER)
                .min(config.max_delay);
        }
        if let Some(hint) = server_hint(error) {
            delay = delay.max(hint).min(config.max_delay);
        }
        if config.jitter {
            delay = full_jitter(delay);
        }
        delay
    }

    fn record_success(&self) {}

    fn record_failure(&self, _reason: RetryReason) {}

    fn bound_config(&self) -> &RetryConfig {
        &self.config
    }

    fn name(&self) -> &'static str {
        "exponential_backoff"
    }
}
