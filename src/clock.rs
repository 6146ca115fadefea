//! Monotonic millisecond clock.
//!
//! The breaker's open-window arithmetic and the token bucket's refill
//! schedule both compute `now - last_timestamp`. Wall-clock steps must not
//! reopen a breaker early or stall refill, so timestamps are milliseconds
//! since a process-wide `Instant` origin rather than epoch time.

use std::sync::OnceLock;
use std::time::Instant;

static ORIGIN: OnceLock<Instant> = OnceLock::new();

/// Milliseconds elapsed since the clock was first read in this process.
pub fn now_ms() -> u64 {
    ORIGIN.get_or_init(Instant::now).elapsed().as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monotonic() {
        let a = now_ms();
        std::thread::sleep(std::time::Duration::from_millis(5));
        let b = now_ms();
        assert!(b >= a + 5);
    }
}
