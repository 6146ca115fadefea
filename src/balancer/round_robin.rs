//! Round-robin selection strategy.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::balancer::{FeatureCode, LoadBalance};
use crate::discovery::Address;

/// Rotates through candidates with an internal atomic counter.
#[derive(Debug, Default)]
pub struct RoundRobin {
    counter: AtomicUsize,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LoadBalance for RoundRobin {
    fn select(
        &self,
        _service: &str,
        addresses: &[Address],
        _code: &FeatureCode,
    ) -> Option<Address> {
        if addresses.is_empty() {
            return None;
        }
        let index = self.counter.fetch_add(1, Ordering::Relaxed) % addresses.len();
        Some(addresses[index].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_robin_rotation() {
        let lb = RoundRobin::new();
        let addrs: Vec<Address> = vec!["a:1".into(), "b:1".into()];
        let code = FeatureCode::Hashed(0);

        assert_eq!(lb.select("svc", &addrs, &code), Some("a:1".into()));
        assert_eq!(lb.select("svc", &addrs, &code), Some("b:1".into()));
        assert_eq!(lb.select("svc", &addrs, &code), Some("a:1".into()));
    }

    #[test]
    fn test_empty_list_yields_none() {
        let lb = RoundRobin::new();
        assert_eq!(lb.select("svc", &[], &FeatureCode::Hashed(0)), None);
    }
}
