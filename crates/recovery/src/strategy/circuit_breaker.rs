use super::{bounded_jitter, retry_allowed, RetryStrategy};
use fetchguard_core::error::ConfigError;
use fetchguard_core::{Error, ErrorContext, RetryConfig, RetryReason};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Circuit breaker states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Requests flow normally.
    Closed,
    /// Requests are rejected without invoking the operation.
    Open,
    /// One trial request is allowed through to probe recovery.
    HalfOpen,
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CircuitState::Closed => write!(f, "closed"),
            CircuitState::Open => write!(f, "open"),
            CircuitState::HalfOpen => write!(f, "half_open"),
        }
    }
}

/// Mutable breaker state. All fields move together under one lock; the
/// transitions are compound (counter + state + timestamp).
#[derive(Debug)]
struct BreakerCell {
    state: CircuitState,
    consecutive_failures: u32,
    open_since: Option<Instant>,
    probe_in_flight: bool,
}

impl BreakerCell {
    fn new() -> Self {
        Self {
            state: CircuitState::Closed,
            consecutive_failures: 0,
            open_since: None,
            probe_in_flight: false,
        }
    }

    fn trip_open(&mut self) {
        self.state = CircuitState::Open;
        self.open_since = Some(Instant::now());
        self.probe_in_flight = false;
    }
}

/// Snapshot of a breaker for monitoring.
#[derive(Debug, Clone)]
pub struct CircuitBreakerStats {
    pub state: CircuitState,
    pub consecutive_failures: u32,
}

/// Fail-fast guard around a chronically failing dependency.
///
/// Closed counts consecutive failures; at `failure_threshold` the circuit
/// opens and `admit` rejects every attempt without invoking the operation
/// until `recovery_timeout` has elapsed. Then exactly one half-open probe is
/// let through: success closes the circuit, failure re-opens it and restarts
/// the cooldown.
///
/// The lock is held only around the counter/state update, never across the
/// wrapped operation or the inter-attempt wait.
#[derive(Debug)]
pub struct CircuitBreakerStrategy {
    config: RetryConfig,
    cell: Mutex<BreakerCell>,
}

impl CircuitBreakerStrategy {
    pub fn new(config: RetryConfig) -> Result<Self, ConfigError> {
        Ok(Self::with_validated(config.validated()?))
    }

    fn with_validated(config: RetryConfig) -> Self {
        Self {
            config,
            cell: Mutex::new(BreakerCell::new()),
        }
    }

    /// Current state, without side effects.
    pub fn state(&self) -> CircuitState {
        self.lock().state
    }

    pub fn stats(&self) -> CircuitBreakerStats {
        let cell = self.lock();
        CircuitBreakerStats {
            state: cell.state,
            consecutive_failures: cell.consecutive_failures,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BreakerCell> {
        // A poisoned breaker lock means a panic mid-update; the cell only
        // holds plain counters, so continuing with them is sound.
        self.cell.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl RetryStrategy for CircuitBreakerStrategy {
    fn admit(&self) -> bool {
        let mut cell = self.lock();
        match cell.state {
            CircuitState::Closed => true,
            CircuitState::Open => {
                let cooled_down = cell
                    .open_since
                    .map(|t| t.elapsed() >= self.config.recovery_timeout)
                    .unwrap_or(true);
                if cooled_down {
                    debug!(state = %CircuitState::HalfOpen, "circuit breaker allows trial attempt");
                    cell.state = CircuitState::HalfOpen;
                    cell.probe_in_flight = true;
                    true
                } else {
                    false
                }
            }
            CircuitState::HalfOpen => {
                if cell.probe_in_flight {
                    false
                } else {
                    cell.probe_in_flight = true;
                    true
                }
            }
        }
    }

    fn should_retry(
        &self,
        attempt: u32,
        _error: &Error,
        reason: RetryReason,
        config: &RetryConfig,
    ) -> bool {
        if !retry_allowed(attempt, reason, config) {
            return false;
        }
        // While open there is no point waiting for another attempt; the
        // next admit() would reject it.
        self.lock().state != CircuitState::Open
    }

    fn backoff_delay(
        &self,
        _attempt: u32,
        _error: &Error,
        _reason: RetryReason,
        config: &RetryConfig,
    ) -> Duration {
        let delay = config.base_delay;
        if config.jitter {
            bounded_jitter(delay, 0.1).min(config.max_delay)
        } else {
            delay
        }
    }

    fn record_success(&self) {
        let mut cell = self.lock();
        match cell.state {
            CircuitState::Closed => {
                cell.consecutive_failures = 0;
            }
            CircuitState::HalfOpen => {
                debug!(state = %CircuitState::Closed, "circuit breaker trial succeeded");
                cell.state = CircuitState::Closed;
                cell.consecutive_failures = 0;
                cell.open_since = None;
                cell.probe_in_flight = false;
            }
            CircuitState::Open => {}
        }
    }

    fn record_failure(&self, reason: RetryReason) {
        if !reason.counts_as_failure() {
            return;
        }
        let mut cell = self.lock();
        match cell.state {
            CircuitState::Closed => {
                cell.consecutive_failures += 1;
                if cell.consecutive_failures >= self.config.failure_threshold {
                    warn!(
                        failures = cell.consecutive_failures,
                        "circuit breaker tripped open"
                    );
                    cell.trip_open();
                }
            }
            CircuitState::HalfOpen => {
                warn!("circuit breaker trial failed, reopening");
                cell.trip_open();
            }
            CircuitState::Open => {}
        }
    }

    fn record_cancelled(&self) {
        let mut cell = self.lock();
        if cell.state == CircuitState::HalfOpen {
            // The probe never completed; free the slot for the next caller.
            cell.probe_in_flight = false;
        }
    }

    fn bound_config(&self) -> &RetryConfig {
        &self.config
    }

    fn name(&self) -> &'static str {
        "circuit_breaker"
    }
}

/// How breaker state is shared across operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitScope {
    /// One breaker per dependency domain; any operation against the service
    /// moves the same counters. Matches sharing one instance per service.
    PerService,
    /// One breaker per operation key, so a single chronically failing item
    /// cannot trip the breaker for unrelated items on the same service.
    PerOperation,
}

/// Hands out circuit breakers per scope key, lazily.
pub struct CircuitBreakerRegistry {
    config: RetryConfig,
    scope: CircuitScope,
    breakers: Mutex<HashMap<String, Arc<CircuitBreakerStrategy>>>,
}

impl CircuitBreakerRegistry {
    pub fn new(config: RetryConfig, scope: CircuitScope) -> Result<Self, ConfigError> {
        Ok(Self {
            config: config.validated()?,
            scope,
            breakers: Mutex::new(HashMap::new()),
        })
    }

    /// The breaker governing this context, created on first use.
    pub fn for_context(&self, context: &ErrorContext) -> Arc<CircuitBreakerStrategy> {
        let key = match self.scope {
            CircuitScope::PerService => context.service_name().to_string(),
            CircuitScope::PerOperation => context.operation_key(),
        };
        let mut breakers = self
            .breakers
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        breakers
            .entry(key)
            .or_insert_with(|| {
                Arc::new(CircuitBreakerStrategy::with_validated(self.config.clone()))
            })
            .clone()
    }

    pub fn scope(&self) -> CircuitScope {
        self.scope
    }

    pub fn len(&self) -> usize {
        self.breakers.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
