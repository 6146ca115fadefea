//! Semantic configuration checks.
//!
//! Serde guarantees the shape; this pass guarantees the values. Strict
//! tunables (thresholds, rates, capacities) fail fast here rather than
//! being silently clamped at runtime.

use thiserror::Error;

use crate::balancer::STRATEGY_NAMES;
use crate::config::schema::DispatchConfig;

/// One semantic problem with a loaded configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("breaker.failure_threshold must be positive")]
    NonPositiveFailureThreshold,

    #[error("breaker.half_open_success_ratio must be in (0, 1], got {0}")]
    RatioOutOfRange(f64),

    #[error("breaker.open_duration_ms must be positive")]
    NonPositiveOpenDuration,

    #[error("rate_limit.tokens_per_second must be positive")]
    NonPositiveRate,

    #[error("rate_limit.capacity must be positive")]
    NonPositiveCapacity,

    #[error("balancer.virtual_nodes must be positive")]
    NonPositiveVirtualNodes,

    #[error("balancer.window_size must be positive")]
    NonPositiveWindow,

    #[error("balancer learning rates must satisfy 0 < min <= max, got [{0}, {1}]")]
    BadLearningRates(f64, f64),

    #[error("unknown balancer.strategy {0:?}")]
    UnknownStrategy(String),

    #[error("retry.max_attempts must be at least 1")]
    NoAttempts,
}

/// Check every tunable; collect all problems rather than stopping at the
/// first so operators see the full list at once.
pub fn validate_config(config: &DispatchConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.breaker.failure_threshold == 0 {
        errors.push(ValidationError::NonPositiveFailureThreshold);
    }
    let ratio = config.breaker.half_open_success_ratio;
    if !(ratio > 0.0 && ratio <= 1.0) {
        errors.push(ValidationError::RatioOutOfRange(ratio));
    }
    if config.breaker.open_duration_ms == 0 {
        errors.push(ValidationError::NonPositiveOpenDuration);
    }

    if config.rate_limit.tokens_per_second == 0 {
        errors.push(ValidationError::NonPositiveRate);
    }
    if config.rate_limit.capacity == 0 {
        errors.push(ValidationError::NonPositiveCapacity);
    }

    if config.balancer.virtual_nodes == 0 {
        errors.push(ValidationError::NonPositiveVirtualNodes);
    }
    if config.balancer.window_size == 0 {
        errors.push(ValidationError::NonPositiveWindow);
    }
    let (min, max) = (
        config.balancer.min_learning_rate,
        config.balancer.max_learning_rate,
    );
    if !(min > 0.0 && min <= max) {
        errors.push(ValidationError::BadLearningRates(min, max));
    }
    if !STRATEGY_NAMES.contains(&config.balancer.strategy.as_str()) {
        errors.push(ValidationError::UnknownStrategy(
            config.balancer.strategy.clone(),
        ));
    }

    if config.retry.max_attempts == 0 {
        errors.push(ValidationError::NoAttempts);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
