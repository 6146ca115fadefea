//! Deterministic 32-bit fingerprinting for ring placement and routing keys.
//!
//! # Design Decisions
//! - xxh32 with a fixed seed: non-cryptographic, avalanche-quality, and
//!   stable across calls and processes for the same input bytes — ring
//!   placement must agree between restarts
//! - Callers may hand over a pre-hashed integer instead of a key string;
//!   both forms of the same logical request hash identically

use xxhash_rust::xxh32::xxh32;

use crate::discovery::Address;

/// Fixed seed; changing it would remap every ring in the fleet.
const RING_SEED: u32 = 0x9747_b28c;

/// Stable 32-bit hash of a byte string.
pub fn hash32(bytes: &[u8]) -> u32 {
    xxh32(bytes, RING_SEED)
}

/// Routing key for one logical call: either a key string hashed on use, or
/// an integer the caller already hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeatureCode {
    Key(String),
    Hashed(u32),
}

impl FeatureCode {
    /// Ring position of this code. Pure: the same logical request always
    /// lands on the same position.
    pub fn value(&self) -> u32 {
        match self {
            FeatureCode::Key(key) => hash32(key.as_bytes()),
            FeatureCode::Hashed(hash) => *hash,
        }
    }
}

impl From<u32> for FeatureCode {
    fn from(hash: u32) -> Self {
        FeatureCode::Hashed(hash)
    }
}

impl From<&str> for FeatureCode {
    fn from(key: &str) -> Self {
        FeatureCode::Key(key.to_string())
    }
}

impl From<String> for FeatureCode {
    fn from(key: String) -> Self {
        FeatureCode::Key(key)
    }
}

/// Derive a feature code from a call's identity so logically identical
/// calls (and their retries) route to the same node.
pub fn feature_code(service: &str, method: &str, args: &[serde_json::Value]) -> FeatureCode {
    let mut key = String::with_capacity(service.len() + method.len() + 16 * args.len());
    key.push_str(service);
    key.push('#');
    key.push_str(method);
    for arg in args {
        key.push('#');
        key.push_str(&arg.to_string());
    }
    FeatureCode::Hashed(hash32(key.as_bytes()))
}

/// Order-insensitive fingerprint of an address list, used to detect
/// topology change without comparing lists element-wise.
pub fn address_list_fingerprint(addresses: &[Address]) -> u32 {
    addresses
        .iter()
        .fold(0u32, |acc, addr| acc ^ hash32(addr.as_str().as_bytes()))
        .wrapping_add(addresses.len() as u32)
}
