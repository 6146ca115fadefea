//! Retry policy for transport calls.
//!
//! # Design Decisions
//! - Fixed backoff and a bounded attempt count; the breaker's open window
//!   already encodes the longer back-off story
//! - Retryability of a transport error is supplied by the transport, not
//!   computed here; response-side retryability is status in [500, 600)

use std::time::Duration;

use thiserror::Error;

use crate::config::RetryConfig;
use crate::dispatch::result::RpcResult;
use crate::error::DispatchError;

/// Failure below the response layer: the call never produced a
/// well-formed response. The transport classifies its own retryability.
#[derive(Debug, Clone, Error)]
#[error("transport failure: {message}")]
pub struct TransportError {
    pub message: String,
    pub retryable: bool,
}

impl TransportError {
    pub fn retryable(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retryable: true,
        }
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retryable: false,
        }
    }
}

/// Bounded fixed-backoff retry policy.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts including the first call.
    pub max_attempts: u32,
    /// Fixed wait between attempts.
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Duration) -> Result<Self, DispatchError> {
        if max_attempts == 0 {
            return Err(DispatchError::InvalidConfig(
                "retry max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            max_attempts,
            backoff,
        })
    }

    pub fn from_config(config: &RetryConfig) -> Result<Self, DispatchError> {
        Self::new(config.max_attempts, Duration::from_millis(config.backoff_ms))
    }

    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            backoff: Duration::ZERO,
        }
    }

    /// Whether this attempt outcome should be retried: a transport error
    /// the transport marked retryable, or a 5xx response.
    pub fn should_retry(&self, outcome: &Result<RpcResult, TransportError>) -> bool {
        match outcome {
            Ok(result) => (500..600).contains(&result.code),
            Err(err) => err.retryable,
        }
    }
}
