//! Admission control subsystem.
//!
//! # Design Decisions
//! - Lock-free: token count and refill timestamp are CAS-updated atomics;
//!   callers on the hot path never take a mutex
//! - One bucket per limited resource (per service or per process), living
//!   for the process lifetime
//! - The strict constructor fails fast on non-positive tunables; only the
//!   explicitly configured wrapper falls back to defaults, and it logs
//!   the fallback

mod token_bucket;

pub use token_bucket::{
    ConfiguredTokenBucket, TokenBucket, DEFAULT_CAPACITY, DEFAULT_TOKENS_PER_SECOND,
};
