//! Crate error types.
//!
//! Only genuinely exceptional conditions are surfaced as errors: bad
//! construction-time configuration and unknown strategy names. Expected
//! runtime outcomes (breaker open, no candidate address, exhausted bucket)
//! are ordinary return values, never errors.

use thiserror::Error;

/// Errors produced by dispatch-core construction and configuration.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A tunable was non-positive or otherwise out of its documented range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The configured load-balancing strategy name is not registered.
    #[error("unknown load balancing strategy: {0}")]
    UnknownStrategy(String),
}
