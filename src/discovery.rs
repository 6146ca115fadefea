//! Service discovery collaborator interface.
//!
//! # Responsibilities
//! - Define the `Address` identity type used across the crate
//! - Define the provider contract the balancer consumes
//! - Supply an in-memory provider for embedding and tests
//!
//! # Design Decisions
//! - The registry itself (ZooKeeper etc.) is an external collaborator;
//!   only the lookup contract lives here
//! - The address list may differ on every call for the same service; the
//!   balancer tolerates that and rebuilds its ring lazily

use std::fmt;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// Identity of one remote node, typically `"host:port"`.
///
/// Kept as an opaque string rather than `SocketAddr` so discovery may hand
/// out unresolved hostnames.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(addr: impl Into<String>) -> Self {
        Self(addr.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Address {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Lookup contract implemented by the service registry integration.
pub trait AddressProvider: Send + Sync {
    /// Current candidate addresses for a service. May change between calls;
    /// an unknown service yields an empty list.
    fn list_addresses(&self, service: &str) -> Vec<Address>;
}

/// In-memory provider for embedding, demos and tests.
#[derive(Debug, Default)]
pub struct StaticProvider {
    services: DashMap<String, Vec<Address>>,
}

impl StaticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the address list for a service.
    pub fn set_addresses(&self, service: &str, addresses: Vec<Address>) {
        self.services.insert(service.to_string(), addresses);
    }

    /// Remove a service entirely.
    pub fn remove_service(&self, service: &str) {
        self.services.remove(service);
    }
}

impl AddressProvider for StaticProvider {
    fn list_addresses(&self, service: &str) -> Vec<Address> {
        self.services
            .get(service)
            .map(|addrs| addrs.clone())
            .unwrap_or_default()
    }
}
