//! Resilience and routing core for RPC clients.
//!
//! Sits between a generated call stub and the raw transport: decides which
//! remote node serves a call, whether the call may proceed right now, and
//! how failures are absorbed without cascading.
//!
//! # Architecture Overview
//!
//! ```text
//!   call stub
//!       │ dispatch(service, feature_code, addresses, invoke)
//!       ▼
//! ┌──────────────────────────────────────────────────────┐
//! │                   CallDispatcher                     │
//! │                                                      │
//! │  ┌───────────┐   ┌────────────────┐   ┌───────────┐  │
//! │  │ balancer  │──▶│ breaker        │──▶│ retry     │  │
//! │  │ (ring /   │   │ registry       │   │ policy    │  │
//! │  │ adaptive) │   │ (per-address)  │   │           │  │
//! │  └───────────┘   └────────────────┘   └─────┬─────┘  │
//! │        ▲                 ▲                  │        │
//! │        │ feedback        │ record           ▼        │
//! │        └─────────────────┴───────── invoke(address)  │
//! └──────────────────────────────────────│───────────────┘
//!                                        ▼
//!                              external transport
//! ```
//!
//! The wire format, serialization, service registration and the transport
//! itself are external collaborators; this crate only carries their
//! interfaces (`AddressProvider`, the `invoke` closure, `ConfigSource`).
//! Server-side overload protection uses the same [`limiter`] bucket the
//! client-side throttle builds on.

// Core subsystems
pub mod balancer;
pub mod breaker;
pub mod config;
pub mod dispatch;
pub mod limiter;

// Collaborator interfaces & cross-cutting concerns
pub mod discovery;
pub mod error;
pub mod observability;

mod clock;

pub use balancer::{feature_code, FeatureCode, LoadBalance, StrategyRegistry};
pub use breaker::{BreakerRegistry, BreakerState, CircuitBreaker};
pub use config::{load_config, ConfigSource, DispatchConfig, TomlSource};
pub use discovery::{Address, AddressProvider, StaticProvider};
pub use dispatch::{CallDispatcher, RetryPolicy, RpcResult, TransportError};
pub use error::DispatchError;
pub use limiter::{ConfiguredTokenBucket, TokenBucket};
