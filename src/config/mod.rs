//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → DispatchConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//!
//! Looser collaborators (the configurable token bucket) read through
//! source.rs, a typed key/value view that tolerates missing or malformed
//! entries by falling back to documented defaults.
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Strict components fail fast on bad values; only the explicitly
//!   "configured" wrappers fall back, and they log the fallback

pub mod loader;
pub mod schema;
pub mod source;
pub mod validation;

pub use loader::load_config;
pub use schema::{BalancerConfig, BreakerConfig, DispatchConfig, RateLimitConfig, RetryConfig};
pub use source::{ConfigSource, TomlSource};
