//! Circuit breaker behavior across whole calls

use integration_tests::common::{download_context, manager_with, FlakyOperation};
use integration_tests::*;
use fetchguard_core::error::ConfigError;
use fetchguard_recovery::{CircuitBreakerRegistry, CircuitScope};

fn breaker_config(failure_threshold: u32, recovery_timeout: Duration) -> RetryConfig {
    RetryConfig {
        // One attempt per call so each call maps to one invocation.
        max_attempts: 1,
        base_delay: Duration::from_millis(10),
        max_delay: Duration::from_millis(100),
        jitter: false,
        failure_threshold,
        recovery_timeout,
        ..Default::default()
    }
}

/// Two failures open the circuit; the next call is rejected without
/// invoking the operation; after the cooldown exactly one trial runs.
#[tokio::test]
async fn breaker_opens_rejects_then_probes() {
    let strategy = Arc::new(
        CircuitBreakerStrategy::new(breaker_config(2, Duration::from_millis(50))).unwrap(),
    );
    let strategy_ref = strategy.clone();
    let (manager, _) = manager_with(strategy);
    let op = FlakyOperation::always_failing();
    let ctx = download_context("doomed");

    for _ in 0..2 {
        let op_ref = op.clone();
        let result = manager.execute_with_retry(|| op_ref.invoke(), &ctx).await;
        assert!(matches!(result, Err(Error::Network(_))));
    }
    assert_eq!(op.calls(), 2);
    assert_eq!(strategy_ref.state(), CircuitState::Open);

    // Rejected immediately, operation not invoked.
    let op_ref = op.clone();
    let result = manager.execute_with_retry(|| op_ref.invoke(), &ctx).await;
    assert!(matches!(result, Err(Error::CircuitOpen { .. })));
    assert_eq!(op.calls(), 2);

    // After the cooldown exactly one trial attempt goes through.
    tokio::time::sleep(Duration::from_millis(60)).await;
    let op_ref = op.clone();
    let result = manager.execute_with_retry(|| op_ref.invoke(), &ctx).await;
    assert!(matches!(result, Err(Error::Network(_))));
    assert_eq!(op.calls(), 3);
    assert_eq!(strategy_ref.state(), CircuitState::Open);
}

/// A successful trial closes the circuit and resets its counter.
#[tokio::test]
async fn successful_probe_closes_the_circuit() {
    let strategy = Arc::new(
        CircuitBreakerStrategy::new(breaker_config(2, Duration::from_millis(30))).unwrap(),
    );
    let strategy_ref = strategy.clone();
    let (manager, _) = manager_with(strategy);
    let ctx = download_context("recovering");

    // Fails twice, then the dependency heals.
    let op = FlakyOperation::new(2);
    for _ in 0..2 {
        let op_ref = op.clone();
        let _ = manager.execute_with_retry(|| op_ref.invoke(), &ctx).await;
    }
    assert_eq!(strategy_ref.state(), CircuitState::Open);

    tokio::time::sleep(Duration::from_millis(40)).await;
    let op_ref = op.clone();
    let result = manager
        .execute_with_retry(|| op_ref.invoke(), &ctx)
        .await
        .unwrap();
    assert_eq!(result, 42);
    assert_eq!(strategy_ref.state(), CircuitState::Closed);
    assert_eq!(strategy_ref.stats().consecutive_failures, 0);
}

/// With per-operation scoping, one chronically failing item does not trip
/// the breaker for other items of the same service.
#[tokio::test]
async fn per_operation_scope_isolates_failing_items() {
    let registry = CircuitBreakerRegistry::new(
        breaker_config(1, Duration::from_secs(60)),
        CircuitScope::PerOperation,
    )
    .unwrap();

    let bad_ctx = download_context("poisoned");
    let good_ctx = download_context("fine");

    let (bad_manager, _) = manager_with(registry.for_context(&bad_ctx));
    let (good_manager, _) = manager_with(registry.for_context(&good_ctx));

    let bad_op = FlakyOperation::always_failing();
    let bad_ref = bad_op.clone();
    let _ = bad_manager
        .execute_with_retry(|| bad_ref.invoke(), &bad_ctx)
        .await;
    assert_eq!(registry.for_context(&bad_ctx).state(), CircuitState::Open);

    // The other item is untouched.
    let good_op = FlakyOperation::new(0);
    let good_ref = good_op.clone();
    let result = good_manager
        .execute_with_retry(|| good_ref.invoke(), &good_ctx)
        .await
        .unwrap();
    assert_eq!(result, 42);
    assert_eq!(registry.len(), 2);
}

/// An invalid breaker configuration is rejected at construction.
#[tokio::test]
async fn invalid_breaker_config_is_fatal() {
    let bad = RetryConfig {
        recovery_timeout: Duration::ZERO,
        ..Default::default()
    };
    let err = CircuitBreakerStrategy::new(bad).unwrap_err();
    assert!(matches!(err, ConfigError::OutOfRange { ref field, .. } if field == "recovery_timeout"));
}
