//! Lock-free token bucket.
//!
//! # Refill Protocol
//! ```text
//! elapsed = now - last_refill
//! if elapsed >= interval:
//!     tokens_to_add = elapsed / interval        (integer division)
//!     CAS last_refill -> last_refill + tokens_to_add * interval
//!     winner credits tokens_to_add, clamped to capacity
//! ```
//! The timestamp CAS elects a single refiller per elapsed window, so
//! concurrent callers cannot double-credit. Integer division advances the
//! timestamp by whole intervals only; the fractional remainder stays
//! banked for the next call instead of being discarded.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use crate::clock::now_ms;
use crate::config::{ConfigSource, RateLimitConfig};
use crate::error::DispatchError;

/// Fallback refill rate for the configured variant.
pub const DEFAULT_TOKENS_PER_SECOND: u32 = 10;
/// Fallback burst capacity for the configured variant.
pub const DEFAULT_CAPACITY: u32 = 100;

/// Lock-free rate limiter holding up to `capacity` permits.
#[derive(Debug)]
pub struct TokenBucket {
    refill_interval_ms: u64,
    capacity: u32,
    tokens: AtomicU32,
    last_refill_ms: AtomicU64,
}

impl TokenBucket {
    /// Create a bucket that grants one token every `refill_interval_ms`,
    /// starting full. Both tunables must be strictly positive.
    pub fn new(refill_interval_ms: u64, capacity: u32) -> Result<Self, DispatchError> {
        if refill_interval_ms == 0 {
            return Err(DispatchError::InvalidConfig(
                "token bucket refill_interval_ms must be positive".to_string(),
            ));
        }
        if capacity == 0 {
            return Err(DispatchError::InvalidConfig(
                "token bucket capacity must be positive".to_string(),
            ));
        }
        Ok(Self::assemble(refill_interval_ms, capacity))
    }

    fn assemble(refill_interval_ms: u64, capacity: u32) -> Self {
        Self {
            refill_interval_ms,
            capacity,
            tokens: AtomicU32::new(capacity),
            last_refill_ms: AtomicU64::new(now_ms()),
        }
    }

    /// Consume one token. `true` means admitted; `false` is an ordinary
    /// negative signal, never an error.
    pub fn try_acquire(&self) -> bool {
        self.refill();

        let mut current = self.tokens.load(Ordering::Acquire);
        loop {
            if current == 0 {
                return false;
            }
            match self.tokens.compare_exchange_weak(
                current,
                current - 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return true,
                Err(seen) => current = seen,
            }
        }
    }

    /// Tokens currently available; a snapshot, already stale on return.
    pub fn available(&self) -> u32 {
        self.tokens.load(Ordering::Acquire)
    }

    fn refill(&self) {
        let now = now_ms();
        let last = self.last_refill_ms.load(Ordering::Acquire);
        let elapsed = now.saturating_sub(last);
        if elapsed < self.refill_interval_ms {
            return;
        }

        let tokens_to_add = elapsed / self.refill_interval_ms;
        let advanced = last + tokens_to_add * self.refill_interval_ms;
        // single-refiller election: only the thread that advances the
        // timestamp credits tokens, so losers cannot double-add
        if self
            .last_refill_ms
            .compare_exchange(last, advanced, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }

        let credit = tokens_to_add.min(u64::from(self.capacity)) as u32;
        let mut current = self.tokens.load(Ordering::Acquire);
        loop {
            let next = current.saturating_add(credit).min(self.capacity);
            match self.tokens.compare_exchange_weak(
                current,
                next,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return,
                Err(seen) => current = seen,
            }
        }
    }
}

/// Token bucket whose tunables come from an external config source, with
/// logged fallback defaults when entries are absent or unparsable.
#[derive(Debug)]
pub struct ConfiguredTokenBucket {
    inner: TokenBucket,
}

impl ConfiguredTokenBucket {
    /// Read `rate_limit.tokens_per_second` and `rate_limit.capacity` from
    /// the source. Missing or non-positive values fall back to the
    /// documented defaults; the fallback is deliberate and logged.
    pub fn from_source(source: &dyn ConfigSource) -> Self {
        let rate = match source.get_i64("rate_limit.tokens_per_second") {
            Some(v) if v > 0 => v as u32,
            Some(v) => {
                tracing::warn!(
                    value = v,
                    default = DEFAULT_TOKENS_PER_SECOND,
                    "non-positive tokens_per_second, using default"
                );
                DEFAULT_TOKENS_PER_SECOND
            }
            None => {
                tracing::warn!(
                    default = DEFAULT_TOKENS_PER_SECOND,
                    "tokens_per_second unset or unparsable, using default"
                );
                DEFAULT_TOKENS_PER_SECOND
            }
        };
        let capacity = match source.get_i64("rate_limit.capacity") {
            Some(v) if v > 0 => v as u32,
            Some(v) => {
                tracing::warn!(
                    value = v,
                    default = DEFAULT_CAPACITY,
                    "non-positive capacity, using default"
                );
                DEFAULT_CAPACITY
            }
            None => {
                tracing::warn!(
                    default = DEFAULT_CAPACITY,
                    "capacity unset or unparsable, using default"
                );
                DEFAULT_CAPACITY
            }
        };

        Self::from_settings(RateLimitConfig {
            tokens_per_second: rate,
            capacity,
        })
    }

    /// Build from an already-validated config section.
    pub fn from_settings(config: RateLimitConfig) -> Self {
        let rate = config.tokens_per_second.max(1);
        let interval_ms = (1000 / u64::from(rate)).max(1);
        Self {
            inner: TokenBucket::assemble(interval_ms, config.capacity.max(1)),
        }
    }

    pub fn try_acquire(&self) -> bool {
        self.inner.try_acquire()
    }

    pub fn available(&self) -> u32 {
        self.inner.available()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TomlSource;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn test_rejects_non_positive_tunables() {
        assert!(TokenBucket::new(0, 5).is_err());
        assert!(TokenBucket::new(100, 0).is_err());
    }

    #[test]
    fn test_starts_full_and_drains() {
        let bucket = TokenBucket::new(60_000, 5).unwrap();
        for _ in 0..5 {
            assert!(bucket.try_acquire());
        }
        assert!(!bucket.try_acquire(), "sixth call must be rejected");
    }

    #[test]
    fn test_refill_after_interval() {
        let bucket = TokenBucket::new(100, 5).unwrap();
        for _ in 0..5 {
            assert!(bucket.try_acquire());
        }
        assert!(!bucket.try_acquire());

        sleep(Duration::from_millis(105));
        assert!(bucket.try_acquire(), "one interval banked one token");
        assert!(!bucket.try_acquire(), "only one token was credited");
    }

    #[test]
    fn test_fractional_elapsed_carries_over() {
        let bucket = TokenBucket::new(100, 10).unwrap();
        for _ in 0..10 {
            assert!(bucket.try_acquire());
        }

        // 150ms = one whole interval plus a 50ms remainder
        sleep(Duration::from_millis(150));
        assert!(bucket.try_acquire());
        assert!(!bucket.try_acquire());

        // the banked 50ms means only ~60ms more completes the next interval
        sleep(Duration::from_millis(70));
        assert!(bucket.try_acquire(), "remainder was preserved, not discarded");
    }

    #[test]
    fn test_never_exceeds_capacity() {
        let bucket = TokenBucket::new(50, 3).unwrap();
        sleep(Duration::from_millis(400));
        // far more than 3 intervals elapsed; credit clamps at capacity
        assert!(bucket.try_acquire());
        assert!(bucket.available() <= 3);
        let mut granted = 1;
        while bucket.try_acquire() {
            granted += 1;
        }
        assert_eq!(granted, 3);
    }

    #[test]
    fn test_concurrent_drain_is_bounded() {
        use std::sync::atomic::{AtomicU32, Ordering};
        use std::sync::Arc;

        let bucket = Arc::new(TokenBucket::new(60_000, 50).unwrap());
        let granted = Arc::new(AtomicU32::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let bucket = bucket.clone();
                let granted = granted.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        if bucket.try_acquire() {
                            granted.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(granted.load(Ordering::Relaxed), 50);
    }

    #[test]
    fn test_configured_bucket_reads_source() {
        let source = TomlSource::from_str(
            r#"
            [rate_limit]
            tokens_per_second = 20
            capacity = 2
            "#,
        );
        let bucket = ConfiguredTokenBucket::from_source(&source);
        assert!(bucket.try_acquire());
        assert!(bucket.try_acquire());
        assert!(!bucket.try_acquire());
    }

    #[test]
    fn test_configured_bucket_falls_back_to_defaults() {
        let source = TomlSource::from_str("rate_limit = { capacity = \"lots\" }");
        let bucket = ConfiguredTokenBucket::from_source(&source);
        // defaults: capacity 100, so a long burst is admitted
        let granted = (0..DEFAULT_CAPACITY + 10)
            .filter(|_| bucket.try_acquire())
            .count() as u32;
        assert_eq!(granted, DEFAULT_CAPACITY);
    }
}
