//! Circuit breaking subsystem.
//!
//! # States
//! - Closed: normal operation, requests pass through
//! - Open: destination assumed down, requests fail fast
//! - Half-Open: probing whether the destination recovered
//!
//! # State Transitions
//! ```text
//! Closed → Open:      failure_count reaches failure_threshold
//! Open → Half-Open:   open_duration_ms elapsed; one CAS winner flips
//! Half-Open → Closed: success_count / request_count >= ratio
//! Half-Open → Open:   any single probe failure
//! ```
//!
//! # Design Decisions
//! - Per-destination breaker (not global), one instance per key for the
//!   registry's lifetime
//! - `allow_request` never blocks and never errors; callers treat `false`
//!   as an ordinary negative signal and produce a fallback result
//! - Half-Open admits every probe rather than serializing to exactly one;
//!   concurrent probes may overshoot the threshold by one, which is an
//!   accepted property of the counters, not a bug
//! - Counters reset on every transition that enters Open or leaves
//!   Half-Open; they are only meaningful within one state epoch

mod breaker;
mod registry;

pub use breaker::{BreakerState, CircuitBreaker};
pub use registry::BreakerRegistry;
