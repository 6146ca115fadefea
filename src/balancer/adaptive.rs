//! Adaptive feedback-weighted selection strategy.
//!
//! # Data Flow
//! ```text
//! select(service, addresses, _)
//!     → purge stats for addresses no longer in the list
//!     → seed weight 1.0 for addresses seen for the first time
//!     → weighted-random draw over current weights
//!
//! feedback(service, address, latency_ms, success)
//!     → append CallRecord to the bounded window (oldest evicted)
//!     → score the call: failure = 0.0, success = 1 - min(latency,1000)/1000
//!     → nudge weight toward the score (sigmoid step, bounded learning
//!       rate that grows with history size), clamped to >= 0.1
//! ```
//!
//! # Design Decisions
//! - Weights floor at 0.1 so a slow or flaky address keeps receiving a
//!   trickle of traffic and can recover
//! - The learning rate grows with history size: a node with little history
//!   moves cautiously, a well-observed node adjusts faster
//! - Stale entries self-heal: every select purges addresses absent from
//!   the caller-supplied list

use std::collections::VecDeque;

use dashmap::DashMap;

use crate::balancer::{FeatureCode, LoadBalance};
use crate::clock::now_ms;
use crate::discovery::Address;

/// Latency saturation point: anything at or above this scores 0.
const LATENCY_CEILING_MS: u64 = 1000;

/// Floor below which a weight is never pushed.
const MIN_WEIGHT: f64 = 0.1;

/// One observed call outcome.
#[derive(Debug, Clone, Copy)]
struct CallRecord {
    latency_ms: u64,
    success: bool,
    #[allow(dead_code)]
    timestamp: u64,
}

#[derive(Debug)]
struct NodeStats {
    weight: f64,
    history: VecDeque<CallRecord>,
}

impl NodeStats {
    fn seed() -> Self {
        Self {
            weight: 1.0,
            history: VecDeque::new(),
        }
    }
}

/// Weighted-random selection driven by observed latency and success.
pub struct AdaptiveWeighted {
    window_size: usize,
    min_rate: f64,
    max_rate: f64,
    stats: DashMap<(String, Address), NodeStats>,
}

impl AdaptiveWeighted {
    pub fn new(window_size: usize, min_rate: f64, max_rate: f64) -> Self {
        Self {
            window_size: window_size.max(1),
            min_rate,
            max_rate,
            stats: DashMap::new(),
        }
    }

    /// Current weight of an address, if tracked.
    pub fn weight_of(&self, service: &str, address: &Address) -> Option<f64> {
        self.stats
            .get(&(service.to_string(), address.clone()))
            .map(|entry| entry.weight)
    }

    fn score(record: &CallRecord) -> f64 {
        if !record.success {
            return 0.0;
        }
        1.0 - (record.latency_ms.min(LATENCY_CEILING_MS) as f64 / LATENCY_CEILING_MS as f64)
    }

    /// Learning rate grows slowly with how much history backs the score.
    fn learning_rate(&self, history_len: usize) -> f64 {
        let growth = 1.0 + (history_len as f64 / self.window_size as f64);
        (self.min_rate * growth).clamp(self.min_rate, self.max_rate)
    }

    fn nudge(&self, weight: f64, score: f64, history_len: usize) -> f64 {
        let rate = self.learning_rate(history_len);
        // sigmoid-centered step: bounded to (-0.5, 0.5) before scaling, so
        // a single outlier cannot swing the weight
        let delta = score - weight;
        let step = 1.0 / (1.0 + (-delta).exp()) - 0.5;
        (weight + step * 2.0 * rate).max(MIN_WEIGHT)
    }
}

impl LoadBalance for AdaptiveWeighted {
    fn select(
        &self,
        service: &str,
        addresses: &[Address],
        _code: &FeatureCode,
    ) -> Option<Address> {
        if addresses.is_empty() {
            return None;
        }

        // Self-heal: drop entries for this service that departed the list.
        self.stats
            .retain(|(svc, addr), _| svc != service || addresses.contains(addr));

        let weights: Vec<f64> = addresses
            .iter()
            .map(|addr| {
                self.stats
                    .entry((service.to_string(), addr.clone()))
                    .or_insert_with(NodeStats::seed)
                    .weight
            })
            .collect();

        let total: f64 = weights.iter().sum();
        let mut draw = fastrand::f64() * total;
        for (addr, weight) in addresses.iter().zip(&weights) {
            draw -= weight;
            if draw <= 0.0 {
                return Some(addr.clone());
            }
        }
        // float underflow on the last subtraction
        addresses.last().cloned()
    }

    fn feedback(&self, service: &str, address: &Address, latency_ms: u64, success: bool) {
        let record = CallRecord {
            latency_ms,
            success,
            timestamp: now_ms(),
        };
        let mut entry = self
            .stats
            .entry((service.to_string(), address.clone()))
            .or_insert_with(NodeStats::seed);

        entry.history.push_back(record);
        while entry.history.len() > self.window_size {
            entry.history.pop_front();
        }

        let history_len = entry.history.len();
        let score = Self::score(&record);
        entry.weight = self.nudge(entry.weight, score, history_len);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addrs(n: usize) -> Vec<Address> {
        (0..n).map(|i| Address::new(format!("10.0.0.{}:9000", i + 1))).collect()
    }

    fn lb() -> AdaptiveWeighted {
        AdaptiveWeighted::new(100, 0.05, 0.5)
    }

    #[test]
    fn test_selection_is_a_member() {
        let lb = lb();
        let addresses = addrs(3);
        for _ in 0..200 {
            let picked = lb.select("svc", &addresses, &FeatureCode::Hashed(0)).unwrap();
            assert!(addresses.contains(&picked));
        }
    }

    #[test]
    fn test_failures_sink_weight_toward_floor() {
        let lb = lb();
        let addresses = addrs(2);
        let bad = &addresses[0];
        lb.select("svc", &addresses, &FeatureCode::Hashed(0));

        for _ in 0..500 {
            lb.feedback("svc", bad, 50, false);
        }
        let weight = lb.weight_of("svc", bad).unwrap();
        assert!(weight >= MIN_WEIGHT);
        assert!(weight < 0.2, "weight {weight} should approach the floor");
    }

    #[test]
    fn test_fast_successes_outweigh_slow_ones() {
        let lb = lb();
        let addresses = addrs(2);
        lb.select("svc", &addresses, &FeatureCode::Hashed(0));

        for _ in 0..200 {
            lb.feedback("svc", &addresses[0], 10, true);
            lb.feedback("svc", &addresses[1], 900, true);
        }
        let fast = lb.weight_of("svc", &addresses[0]).unwrap();
        let slow = lb.weight_of("svc", &addresses[1]).unwrap();
        assert!(fast > slow, "fast {fast} vs slow {slow}");
    }

    #[test]
    fn test_departed_addresses_are_purged() {
        let lb = lb();
        let full = addrs(3);
        lb.select("svc", &full, &FeatureCode::Hashed(0));
        assert!(lb.weight_of("svc", &full[2]).is_some());

        let shrunk = full[..2].to_vec();
        lb.select("svc", &shrunk, &FeatureCode::Hashed(0));
        assert!(lb.weight_of("svc", &full[2]).is_none());
        // other services are untouched by the purge
        lb.select("other", &full, &FeatureCode::Hashed(0));
        lb.select("svc", &shrunk, &FeatureCode::Hashed(0));
        assert!(lb.weight_of("other", &full[2]).is_some());
    }

    #[test]
    fn test_degraded_node_receives_less_traffic() {
        let lb = lb();
        let addresses = addrs(2);
        lb.select("svc", &addresses, &FeatureCode::Hashed(0));
        for _ in 0..500 {
            lb.feedback("svc", &addresses[0], 5, true);
            lb.feedback("svc", &addresses[1], 5, false);
        }

        let mut healthy_hits = 0;
        for _ in 0..1000 {
            if lb.select("svc", &addresses, &FeatureCode::Hashed(0)).unwrap() == addresses[0] {
                healthy_hits += 1;
            }
        }
        // healthy weight ~1.0 vs floor 0.1: expect a heavy skew but never
        // complete starvation of the degraded node
        assert!(healthy_hits > 700, "healthy hits {healthy_hits}");
        assert!(healthy_hits < 1000, "degraded node fully starved");
    }
}
