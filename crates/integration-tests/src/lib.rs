//! Integration tests library for the FetchGuard recovery engine
//!
//! This crate contains shared utilities and helpers for integration testing.

pub mod common;

// Re-export commonly used types for tests
pub use fetchguard_core::{Error, ErrorContext, RetryConfig, RetryReason};
pub use fetchguard_recovery::{
    AdaptiveStrategy, CircuitBreakerStrategy, CircuitState, ErrorRecoveryManager,
    ExponentialBackoffStrategy, FixedDelayStrategy, MemoryReporter, RetryStrategy,
};
pub use std::sync::Arc;
pub use std::time::Duration;
