//! Retry strategy abstraction and its implementations
//!
//! A strategy answers two questions for the recovery manager: should a
//! failed operation be attempted again, and how long to wait first. Strategy
//! instances are long-lived and shared across concurrent calls targeting the
//! same dependency; anything mutable inside them sits behind one lock per
//! instance, held only for the short counter update.

mod adaptive;
mod circuit_breaker;
mod exponential;
mod fixed;

pub use adaptive::AdaptiveStrategy;
pub use circuit_breaker::{
    CircuitBreakerRegistry, CircuitBreakerStats, CircuitBreakerStrategy, CircuitScope, CircuitState,
};
pub use exponential::ExponentialBackoffStrategy;
pub use fixed::FixedDelayStrategy;

use fetchguard_core::error::QuotaError;
use fetchguard_core::{Error, RetryConfig, RetryReason};
use std::time::Duration;

/// Decision and backoff interface shared by all retry strategies.
///
/// The `config` parameter on the decision methods is the effective
/// configuration resolved by the manager: the caller's per-call override
/// when one was given, otherwise the strategy's own bound config. Numeric
/// parameters always come from it; long-lived state (circuit, window)
/// always belongs to the instance.
pub trait RetryStrategy: Send + Sync {
    /// Pre-flight admission check, consulted before each invocation of the
    /// wrapped operation. Circuit breakers refuse here while open.
    fn admit(&self) -> bool {
        true
    }

    /// Whether attempt `attempt` (1-based) having failed with `error`,
    /// classified as `reason`, should be followed by another attempt.
    fn should_retry(
        &self,
        attempt: u32,
        error: &Error,
        reason: RetryReason,
        config: &RetryConfig,
    ) -> bool;

    /// Delay to wait before the next attempt.
    fn backoff_delay(
        &self,
        attempt: u32,
        error: &Error,
        reason: RetryReason,
        config: &RetryConfig,
    ) -> Duration;

    /// Feed a successful attempt into the strategy's accounting.
    fn record_success(&self);

    /// Feed a failed attempt into the strategy's accounting.
    fn record_failure(&self, reason: RetryReason);

    /// Release any per-attempt state held for a call that was cancelled.
    /// Cancellation is not a failure and must not move any counters.
    fn record_cancelled(&self) {}

    /// The configuration this strategy was constructed with.
    fn bound_config(&self) -> &RetryConfig;

    fn name(&self) -> &'static str;
}

/// Shared retry gate: attempts remain, the reason is neither permanent nor
/// a cancellation.
pub(crate) fn retry_allowed(attempt: u32, reason: RetryReason, config: &RetryConfig) -> bool {
    attempt < config.max_attempts && reason.counts_as_failure() && !reason.is_permanent()
}

/// `base_delay * exponential_base^(attempt-1)`, capped at `max_delay`.
/// Computed in float milliseconds so large exponents saturate at the cap
/// instead of overflowing.
pub(crate) fn exponential_delay(
    attempt: u32,
    base_delay: Duration,
    exponential_base: f64,
    max_delay: Duration,
) -> Duration {
    let factor = exponential_base.powi(attempt.saturating_sub(1).min(64) as i32);
    let millis = base_delay.as_millis() as f64 * factor;
    if !millis.is_finite() || millis >= max_delay.as_millis() as f64 {
        max_delay
    } else {
        Duration::from_millis(millis as u64).min(max_delay)
    }
}

/// Full multiplicative jitter: a uniform fraction in [0, 1] of the delay.
pub(crate) fn full_jitter(delay: Duration) -> Duration {
    delay.mul_f64(rand::random::<f64>())
}

/// Bounded jitter: the delay perturbed by at most ±`fraction`.
pub(crate) fn bounded_jitter(delay: Duration, fraction: f64) -> Duration {
    let jitter = (rand::random::<f64>() - 0.5) * 2.0 * fraction;
    delay.mul_f64((1.0 + jitter).max(0.0))
}

/// Server-suggested minimum wait, when the error carried one (Retry-After).
pub(crate) fn server_hint(error: &Error) -> Option<Duration> {
    match error {
        Error::Quota(QuotaError::RateLimited { retry_after }) => {
            retry_after.map(Duration::from_secs)
        }
        _ => None,
    }
}
