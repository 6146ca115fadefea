//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! dispatch(service, feature_code, addresses)
//!     → strategy.select(service, addresses, feature_code)
//!         - random.rs (uniform pick)
//!         - round_robin.rs (rotate through addresses)
//!         - consistent.rs (ring successor lookup, cached per service)
//!         - adaptive.rs (latency/success-weighted random)
//!     → Some(address) or None when the candidate list is empty
//!
//! After the call completes the dispatcher reports
//!     strategy.feedback(service, address, latency_ms, success)
//! which only the adaptive strategy acts on.
//! ```
//!
//! # Design Decisions
//! - Strategies are trait objects selected by config string through an
//!   explicit registry map populated at startup (no reflection discovery)
//! - An empty candidate list is a normal negative result, not an error
//! - Strategies own whatever per-service caches they need; callers pass
//!   the current address list on every call and stale state self-heals

pub mod adaptive;
pub mod consistent;
pub mod hash;
pub mod random;
pub mod ring;
pub mod round_robin;

use std::collections::HashMap;
use std::sync::Arc;

pub use hash::{address_list_fingerprint, feature_code, hash32, FeatureCode};

use crate::config::BalancerConfig;
use crate::discovery::Address;
use crate::error::DispatchError;

/// Strategy names accepted in configuration, in registration order.
pub const STRATEGY_NAMES: [&str; 4] = [
    "random",
    "round_robin",
    "consistent_hash",
    "adaptive_weighted",
];

/// One address-selection strategy.
pub trait LoadBalance: Send + Sync {
    /// Pick one address for this call, or `None` if the list is empty.
    fn select(
        &self,
        service: &str,
        addresses: &[Address],
        code: &FeatureCode,
    ) -> Option<Address>;

    /// Report a completed call. Only feedback-driven strategies act on it.
    fn feedback(&self, _service: &str, _address: &Address, _latency_ms: u64, _success: bool) {}
}

type StrategyFactory = Box<dyn Fn(&BalancerConfig) -> Arc<dyn LoadBalance> + Send + Sync>;

/// Explicit `name -> factory` map, populated at startup and consulted with
/// the configured strategy string.
pub struct StrategyRegistry {
    factories: HashMap<String, StrategyFactory>,
}

impl StrategyRegistry {
    /// Empty registry; use [`StrategyRegistry::with_builtins`] unless a
    /// fully custom strategy set is wanted.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registry pre-populated with the four built-in strategies.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("random", |_| Arc::new(random::Random::new()));
        registry.register("round_robin", |_| Arc::new(round_robin::RoundRobin::new()));
        registry.register("consistent_hash", |cfg| {
            Arc::new(consistent::ConsistentHash::new(cfg.virtual_nodes))
        });
        registry.register("adaptive_weighted", |cfg| {
            Arc::new(adaptive::AdaptiveWeighted::new(
                cfg.window_size,
                cfg.min_learning_rate,
                cfg.max_learning_rate,
            ))
        });
        registry
    }

    /// Register or replace a strategy factory.
    pub fn register(
        &mut self,
        name: &str,
        factory: impl Fn(&BalancerConfig) -> Arc<dyn LoadBalance> + Send + Sync + 'static,
    ) {
        self.factories.insert(name.to_string(), Box::new(factory));
    }

    /// Build the strategy named by `config.strategy`.
    pub fn build(&self, config: &BalancerConfig) -> Result<Arc<dyn LoadBalance>, DispatchError> {
        self.factories
            .get(&config.strategy)
            .map(|factory| factory(config))
            .ok_or_else(|| DispatchError::UnknownStrategy(config.strategy.clone()))
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
