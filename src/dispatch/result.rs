//! Uniform call result surface.

use serde::{Deserialize, Serialize};

/// Successful application response.
pub const CODE_OK: i32 = 200;
/// Fast-fail: breaker open or admission rejected; the network was never
/// touched.
pub const CODE_REJECTED: i32 = 429;
/// Transport or remote server failure after retries.
pub const CODE_UPSTREAM_FAILURE: i32 = 500;
/// Routing failure: the service has no known nodes.
pub const CODE_UNAVAILABLE: i32 = 503;

/// What every dispatch returns, whether the call reached the network or
/// not. Callers distinguish fallback outcomes by `code`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcResult {
    pub success: bool,
    pub code: i32,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

impl RpcResult {
    /// Successful response carrying a payload.
    pub fn ok(data: impl Into<Option<serde_json::Value>>) -> Self {
        Self {
            success: true,
            code: CODE_OK,
            message: "ok".to_string(),
            data: data.into(),
        }
    }

    /// A response with an explicit status code; `success` follows the
    /// HTTP-style convention of codes below 400.
    pub fn with_status(code: i32, message: impl Into<String>) -> Self {
        Self {
            success: code < 400,
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Routing failure fallback: no candidate address.
    pub fn unavailable(service: &str) -> Self {
        Self::with_status(
            CODE_UNAVAILABLE,
            format!("no available node for service {service}"),
        )
    }

    /// Admission rejection fallback: breaker open or limiter exhausted.
    pub fn rejected(address: &str) -> Self {
        Self::with_status(
            CODE_REJECTED,
            format!("request to {address} rejected, destination circuit open"),
        )
    }

    /// Whether this outcome counts against the destination's breaker.
    /// Only transport/server trouble does; application 4xx does not.
    pub fn is_breaker_failure(&self) -> bool {
        self.code >= 500 || self.code == CODE_REJECTED
    }
}
