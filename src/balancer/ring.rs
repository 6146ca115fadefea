//! Virtual-node hash ring.
//!
//! # Responsibilities
//! - Map each real address to N synthetic positions on a 32-bit ring
//! - Successor lookup: first position at or after a hash, wrapping
//!
//! # Design Decisions
//! - Rings are immutable after construction; topology change means a
//!   wholesale rebuild published atomically by the owning strategy, so
//!   readers never observe a partially populated ring
//! - Virtual node names are `"{address}#{index}"`, matching how placement
//!   stays stable across processes

use std::collections::BTreeMap;

use crate::balancer::hash::hash32;
use crate::discovery::Address;

/// Immutable sorted mapping from ring position to real address.
#[derive(Debug, Clone, Default)]
pub struct HashRing {
    entries: BTreeMap<u32, Address>,
}

impl HashRing {
    /// Build a ring with `virtual_nodes` entries per address.
    pub fn build(addresses: &[Address], virtual_nodes: usize) -> Self {
        let mut entries = BTreeMap::new();
        for addr in addresses {
            for index in 0..virtual_nodes {
                let vnode = format!("{}#{}", addr, index);
                entries.insert(hash32(vnode.as_bytes()), addr.clone());
            }
        }
        Self { entries }
    }

    /// Successor lookup: the first entry with position >= `hash`, wrapping
    /// to the smallest position. `None` only for an empty ring.
    pub fn locate(&self, hash: u32) -> Option<&Address> {
        self.entries
            .range(hash..)
            .next()
            .or_else(|| self.entries.iter().next())
            .map(|(_, addr)| addr)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of virtual entries on the ring.
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
