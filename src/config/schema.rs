//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files and
//! carry defaults so a minimal (or empty) config is valid.

use serde::{Deserialize, Serialize};

/// Root configuration for the dispatch core.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DispatchConfig {
    /// Load balancer strategy and tunables.
    pub balancer: BalancerConfig,

    /// Per-destination circuit breaker settings.
    pub breaker: BreakerConfig,

    /// Token bucket admission settings.
    pub rate_limit: RateLimitConfig,

    /// Outbound retry settings.
    pub retry: RetryConfig,
}

/// Load balancer configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BalancerConfig {
    /// Strategy name: `random`, `round_robin`, `consistent_hash`
    /// or `adaptive_weighted`.
    pub strategy: String,

    /// Virtual nodes per real address on the hash ring.
    pub virtual_nodes: usize,

    /// Bounded call-record window per address (adaptive strategy).
    pub window_size: usize,

    /// Lower bound on the adaptive learning rate.
    pub min_learning_rate: f64,

    /// Upper bound on the adaptive learning rate.
    pub max_learning_rate: f64,
}

impl Default for BalancerConfig {
    fn default() -> Self {
        Self {
            strategy: "consistent_hash".to_string(),
            virtual_nodes: 500,
            window_size: 100,
            min_learning_rate: 0.05,
            max_learning_rate: 0.5,
        }
    }
}

/// Circuit breaker configuration, shared by every breaker in a registry.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct BreakerConfig {
    /// Consecutive failures in CLOSED before the breaker opens.
    pub failure_threshold: u32,

    /// Success ratio in HALF_OPEN required to close again, in (0, 1].
    pub half_open_success_ratio: f64,

    /// How long an open breaker rejects before probing, in milliseconds.
    pub open_duration_ms: u64,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            half_open_success_ratio: 0.5,
            open_duration_ms: 10_000,
        }
    }
}

/// Token bucket configuration.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Refill rate in tokens per second.
    pub tokens_per_second: u32,

    /// Maximum tokens held (burst size).
    pub capacity: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            tokens_per_second: 10,
            capacity: 100,
        }
    }
}

/// Retry policy configuration.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts including the first call; must be at least 1.
    pub max_attempts: u32,

    /// Fixed wait between attempts, in milliseconds.
    pub backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_ms: 100,
        }
    }
}
