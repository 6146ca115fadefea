//! Lazily-populated breaker registry.
//!
//! # Design Decisions
//! - One `CircuitBreaker` per destination for the registry's lifetime;
//!   the per-key map entry serializes racing first accesses so every
//!   caller gets the same instance
//! - Shared configuration is validated once at construction and reused
//!   for every breaker created afterwards
//! - An explicit registry object passed to the dispatcher, not a process
//!   global

use std::sync::Arc;

use dashmap::DashMap;

use crate::breaker::breaker::{validate_config, CircuitBreaker};
use crate::config::BreakerConfig;
use crate::discovery::Address;
use crate::error::DispatchError;

/// Creates and caches exactly one breaker per destination address.
#[derive(Debug)]
pub struct BreakerRegistry {
    config: BreakerConfig,
    breakers: DashMap<Address, Arc<CircuitBreaker>>,
}

impl BreakerRegistry {
    /// Create a registry; the shared config is validated here so per-key
    /// creation can never fail.
    pub fn new(config: BreakerConfig) -> Result<Self, DispatchError> {
        validate_config(&config)?;
        Ok(Self {
            config,
            breakers: DashMap::new(),
        })
    }

    /// The breaker for a destination, created on first reference.
    pub fn get(&self, address: &Address) -> Arc<CircuitBreaker> {
        if let Some(existing) = self.breakers.get(address) {
            return existing.clone();
        }
        self.breakers
            .entry(address.clone())
            .or_insert_with(|| Arc::new(CircuitBreaker::new_unchecked(self.config)))
            .value()
            .clone()
    }

    /// Number of destinations currently tracked.
    pub fn len(&self) -> usize {
        self.breakers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.breakers.is_empty()
    }
}
