//! Call orchestration subsystem.
//!
//! # Data Flow
//! ```text
//! dispatch(service, feature_code, addresses, invoke)
//!     → balancer.select(...)              (none → 503 Unavailable)
//!     → breakers.get(address).allow_request()
//!         false → 429 fast-fail, network untouched
//!     → invoke(address) under the retry policy
//!         retry on transport error or 5xx, fixed backoff, bounded attempts
//!     → classify: >=500 or 429 is breaker failure, everything else
//!       (well-formed 4xx included) is breaker success
//!     → breaker.record_*; balancer.feedback(address, latency, success)
//! ```
//!
//! # Design Decisions
//! - `invoke` is a plain async closure; no reflection, any transport fits
//! - Admission rejections are returned as ordinary results, never errors,
//!   so callers handle them like any other unsuccessful RPC outcome
//! - The breaker tracks transport/server health, not business
//!   correctness: application-level 4xx never trips it

mod dispatcher;
mod result;
mod retry;

pub use dispatcher::CallDispatcher;
pub use result::{RpcResult, CODE_OK, CODE_REJECTED, CODE_UNAVAILABLE, CODE_UPSTREAM_FAILURE};
pub use retry::{RetryPolicy, TransportError};
