//! Metric names and recording helpers.
//!
//! # Metrics
//! - `dispatch_fast_fail_total` (counter): calls rejected without touching
//!   the network, labeled by reason
//! - `dispatch_breaker_transitions_total` (counter): breaker state
//!   changes, labeled by the state entered
//! - `dispatch_retries_total` (counter): retry attempts, labeled by
//!   service

/// A call was rejected before reaching the transport.
pub fn record_fast_fail(reason: &'static str) {
    metrics::counter!("dispatch_fast_fail_total", "reason" => reason).increment(1);
}

/// A breaker entered a new state.
pub fn record_breaker_transition(to: &'static str) {
    metrics::counter!("dispatch_breaker_transitions_total", "to" => to).increment(1);
}

/// An attempt was retried.
pub fn record_retry(service: &str) {
    metrics::counter!("dispatch_retries_total", "service" => service.to_string()).increment(1);
}
