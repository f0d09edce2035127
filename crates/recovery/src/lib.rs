//! Retry coordination and error recovery for the FetchGuard orchestrator.
//!
//! One rule governs the whole system: only the orchestrating layer retries.
//! Every downstream service fails fast and returns a structured error; this
//! crate is where those errors are classified, reported and — when the
//! strategy allows — retried.

pub mod classify;
pub mod handler;
pub mod manager;
pub mod reporter;
pub mod settings;
pub mod strategy;

pub use classify::classify;
pub use handler::{
    DownloadErrorHandler, MetadataErrorHandler, ServiceErrorHandler, StorageErrorHandler,
};
pub use manager::{ErrorRecoveryManager, ErrorRecoveryManagerBuilder, InFlightOperation};
pub use reporter::{ErrorReporter, MemoryReporter, TracingReporter};
pub use settings::{init_tracing, LoggingSettings, RecoverySettings, RetryProfileSettings};
pub use strategy::{
    AdaptiveStrategy, CircuitBreakerRegistry, CircuitBreakerStats, CircuitBreakerStrategy,
    CircuitScope, CircuitState, ExponentialBackoffStrategy, FixedDelayStrategy, RetryStrategy,
};
