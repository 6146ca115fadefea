//! Observability subsystem.
//!
//! # Responsibilities
//! - Initialize structured logging
//! - Name and record the crate's metrics in one place
//!
//! # Design Decisions
//! - `tracing` for structured logging, level configurable via `RUST_LOG`
//! - Metric updates are plain counter increments; exposition is the
//!   embedding application's concern

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
