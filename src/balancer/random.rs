//! Uniform random selection strategy.

use crate::balancer::{FeatureCode, LoadBalance};
use crate::discovery::Address;

/// Picks uniformly among the candidates; stateless.
#[derive(Debug, Default)]
pub struct Random;

impl Random {
    pub fn new() -> Self {
        Self
    }
}

impl LoadBalance for Random {
    fn select(
        &self,
        _service: &str,
        addresses: &[Address],
        _code: &FeatureCode,
    ) -> Option<Address> {
        if addresses.is_empty() {
            return None;
        }
        Some(addresses[fastrand::usize(..addresses.len())].clone())
    }
}
