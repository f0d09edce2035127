use crate::error::ConfigError;
use std::time::Duration;

/// Tuning knobs for a retry strategy.
///
/// One instance is bound to a strategy for its whole lifetime; callers may
/// additionally pass a per-call override to the manager. Invalid values are
/// rejected at strategy construction, never clamped.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first.
    pub max_attempts: u32,
    /// Base delay between attempts.
    pub base_delay: Duration,
    /// Upper bound on any computed delay.
    pub max_delay: Duration,
    /// Whether to randomize delays to avoid synchronized retries.
    pub jitter: bool,
    /// Multiplier for exponential backoff.
    pub exponential_base: f64,
    /// Consecutive failures before a circuit breaker opens.
    pub failure_threshold: u32,
    /// Cooldown before an open circuit allows a trial attempt.
    pub recovery_timeout: Duration,
    /// Number of recent outcomes an adaptive strategy remembers.
    pub window_size: usize,
    /// Success rate below which an adaptive strategy turns conservative.
    pub success_threshold: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            jitter: true,
            exponential_base: 2.0,
            failure_threshold: 5,
            recovery_timeout: Duration::from_secs(60),
            window_size: 20,
            success_threshold: 0.5,
        }
    }
}

impl RetryConfig {
    /// Check every invariant, reporting the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts < 1 {
            return Err(ConfigError::out_of_range(
                "max_attempts",
                self.max_attempts.to_string(),
                ">= 1",
            ));
        }
        if self.base_delay.is_zero() {
            return Err(ConfigError::out_of_range(
                "base_delay",
                "0",
                "> 0",
            ));
        }
        if self.max_delay < self.base_delay {
            return Err(ConfigError::out_of_range(
                "max_delay",
                format!("{:?}", self.max_delay),
                format!(">= base_delay ({:?})", self.base_delay),
            ));
        }
        if self.exponential_base <= 1.0 {
            return Err(ConfigError::out_of_range(
                "exponential_base",
                self.exponential_base.to_string(),
                "> 1",
            ));
        }
        if self.failure_threshold < 1 {
            return Err(ConfigError::out_of_range(
                "failure_threshold",
                self.failure_threshold.to_string(),
                ">= 1",
            ));
        }
        if self.recovery_timeout.is_zero() {
            return Err(ConfigError::out_of_range(
                "recovery_timeout",
                "0",
                "> 0",
            ));
        }
        if self.window_size < 1 {
            return Err(ConfigError::out_of_range(
                "window_size",
                self.window_size.to_string(),
                ">= 1",
            ));
        }
        if !(self.success_threshold > 0.0 && self.success_threshold <= 1.0) {
            return Err(ConfigError::out_of_range(
                "success_threshold",
                self.success_threshold.to_string(),
                "in (0, 1]",
            ));
        }
        Ok(())
    }

    /// Validate and return self, for use in strategy constructors.
    pub fn validated(self) -> Result<Self, ConfigError> {
        self.validate()?;
        Ok(self)
    }
}
