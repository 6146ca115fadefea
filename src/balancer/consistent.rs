//! Consistent-hash selection strategy.
//!
//! # Responsibilities
//! - Cache one ring per service and serve successor lookups from it
//! - Detect topology change and republish a freshly built ring atomically
//!
//! # Design Decisions
//! - Rings are never patched in place: a changed address list triggers a
//!   wholesale rebuild stored through `ArcSwap`, so concurrent readers see
//!   either the old ring or the new one in its entirety
//! - Topology change is detected by an order-insensitive fingerprint of
//!   the address list, keeping the unchanged-topology hot path read-only
//! - Rings for different services are independent entries in the cache

use std::sync::Arc;

use arc_swap::ArcSwap;
use dashmap::DashMap;

use crate::balancer::hash::address_list_fingerprint;
use crate::balancer::ring::HashRing;
use crate::balancer::{FeatureCode, LoadBalance};
use crate::discovery::Address;

/// A published ring plus the fingerprint of the list it was built from.
#[derive(Debug)]
struct ServiceRing {
    fingerprint: u32,
    ring: HashRing,
}

impl ServiceRing {
    fn build(addresses: &[Address], fingerprint: u32, virtual_nodes: usize) -> Self {
        Self {
            fingerprint,
            ring: HashRing::build(addresses, virtual_nodes),
        }
    }
}

/// Stable request-to-node assignment via a virtual-node hash ring.
pub struct ConsistentHash {
    virtual_nodes: usize,
    rings: DashMap<String, ArcSwap<ServiceRing>>,
}

impl ConsistentHash {
    pub fn new(virtual_nodes: usize) -> Self {
        Self {
            virtual_nodes,
            rings: DashMap::new(),
        }
    }
}

impl LoadBalance for ConsistentHash {
    fn select(
        &self,
        service: &str,
        addresses: &[Address],
        code: &FeatureCode,
    ) -> Option<Address> {
        if addresses.is_empty() {
            // Drop the cached ring so a later repopulation starts clean.
            self.rings.remove(service);
            return None;
        }

        let fingerprint = address_list_fingerprint(addresses);
        let position = code.value();

        if let Some(slot) = self.rings.get(service) {
            let current = slot.load_full();
            if current.fingerprint == fingerprint {
                return current.ring.locate(position).cloned();
            }
            tracing::debug!(
                service,
                addresses = addresses.len(),
                "address list changed, rebuilding ring"
            );
            let fresh = Arc::new(ServiceRing::build(addresses, fingerprint, self.virtual_nodes));
            let selected = fresh.ring.locate(position).cloned();
            slot.store(fresh);
            return selected;
        }

        // First sight of this service. A concurrent first call builds an
        // identical ring, so last-writer-wins insertion is harmless.
        let fresh = Arc::new(ServiceRing::build(addresses, fingerprint, self.virtual_nodes));
        let selected = fresh.ring.locate(position).cloned();
        self.rings.insert(service.to_string(), ArcSwap::from(fresh));
        selected
    }
}
