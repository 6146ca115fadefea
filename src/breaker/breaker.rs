//! Per-destination circuit breaker state machine.

use std::sync::atomic::{AtomicU32, AtomicU64, AtomicU8, Ordering};

use crate::clock::now_ms;
use crate::config::BreakerConfig;
use crate::error::DispatchError;
use crate::observability::metrics;

/// Bound on state re-evaluation when losing the Open → Half-Open race.
/// A loop instead of recursion keeps the stack flat under contention.
const MAX_STATE_CHECKS: u32 = 8;

/// Breaker state, stored as a u8 for atomic access.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    Closed = 0,
    Open = 1,
    HalfOpen = 2,
}

impl From<u8> for BreakerState {
    fn from(val: u8) -> Self {
        match val {
            1 => BreakerState::Open,
            2 => BreakerState::HalfOpen,
            _ => BreakerState::Closed,
        }
    }
}

/// Failure-containment gate for one destination.
#[derive(Debug)]
pub struct CircuitBreaker {
    state: AtomicU8,
    failure_count: AtomicU32,
    success_count: AtomicU32,
    request_count: AtomicU32,
    /// Monotonic ms timestamp of the failure that opened the breaker.
    last_failure_ms: AtomicU64,
    config: BreakerConfig,
}

impl CircuitBreaker {
    /// Create a breaker, failing fast on out-of-range configuration.
    pub fn new(config: BreakerConfig) -> Result<Self, DispatchError> {
        validate(&config)?;
        Ok(Self::new_unchecked(config))
    }

    /// For callers that validated the shared config once up front.
    pub(crate) fn new_unchecked(config: BreakerConfig) -> Self {
        Self {
            state: AtomicU8::new(BreakerState::Closed as u8),
            failure_count: AtomicU32::new(0),
            success_count: AtomicU32::new(0),
            request_count: AtomicU32::new(0),
            last_failure_ms: AtomicU64::new(0),
            config,
        }
    }

    pub fn state(&self) -> BreakerState {
        self.state.load(Ordering::Acquire).into()
    }

    /// Admission gate. `false` means fail fast without touching the
    /// network; never blocks, never errors.
    pub fn allow_request(&self) -> bool {
        for _ in 0..MAX_STATE_CHECKS {
            match self.state() {
                BreakerState::Closed => return true,
                BreakerState::HalfOpen => {
                    // every admitted call in Half-Open counts as a probe
                    self.request_count.fetch_add(1, Ordering::Relaxed);
                    return true;
                }
                BreakerState::Open => {
                    let last = self.last_failure_ms.load(Ordering::Acquire);
                    let elapsed = now_ms().saturating_sub(last);
                    if elapsed <= self.config.open_duration_ms {
                        return false;
                    }
                    // exactly one caller wins the flip to Half-Open and
                    // counts itself as the first probe; losers re-read the
                    // state, which may have just changed under them
                    if self
                        .state
                        .compare_exchange(
                            BreakerState::Open as u8,
                            BreakerState::HalfOpen as u8,
                            Ordering::AcqRel,
                            Ordering::Acquire,
                        )
                        .is_ok()
                    {
                        self.reset_counters();
                        self.request_count.fetch_add(1, Ordering::Relaxed);
                        tracing::info!(elapsed_ms = elapsed, "breaker half-open, probing");
                        metrics::record_breaker_transition("half_open");
                        return true;
                    }
                }
            }
        }
        // pathological contention; reject conservatively
        false
    }

    /// Record a healthy outcome. No-op in Closed (cumulative counters only
    /// reset on state change); in Half-Open it may close the breaker.
    pub fn record_success(&self) {
        if self.state() != BreakerState::HalfOpen {
            return;
        }
        let successes = self.success_count.fetch_add(1, Ordering::AcqRel) + 1;
        let requests = self.request_count.load(Ordering::Acquire);
        if requests > 0
            && successes as f64 / requests as f64 >= self.config.half_open_success_ratio
            && self
                .state
                .compare_exchange(
                    BreakerState::HalfOpen as u8,
                    BreakerState::Closed as u8,
                    Ordering::AcqRel,
                    Ordering::Acquire,
                )
                .is_ok()
        {
            self.reset_counters();
            tracing::info!(probes = requests, "breaker closed");
            metrics::record_breaker_transition("closed");
        }
    }

    /// Record a failed outcome. Opens the breaker from Closed once the
    /// threshold is reached; a single Half-Open probe failure reopens it.
    pub fn record_failure(&self) {
        match self.state() {
            BreakerState::Closed => {
                let failures = self.failure_count.fetch_add(1, Ordering::AcqRel) + 1;
                if failures >= self.config.failure_threshold {
                    // stamp before flipping so Open readers see a fresh window
                    self.last_failure_ms.store(now_ms(), Ordering::Release);
                    if self
                        .state
                        .compare_exchange(
                            BreakerState::Closed as u8,
                            BreakerState::Open as u8,
                            Ordering::AcqRel,
                            Ordering::Acquire,
                        )
                        .is_ok()
                    {
                        self.reset_counters();
                        tracing::warn!(failures, "breaker opened");
                        metrics::record_breaker_transition("open");
                    }
                }
            }
            BreakerState::HalfOpen => {
                self.last_failure_ms.store(now_ms(), Ordering::Release);
                if self
                    .state
                    .compare_exchange(
                        BreakerState::HalfOpen as u8,
                        BreakerState::Open as u8,
                        Ordering::AcqRel,
                        Ordering::Acquire,
                    )
                    .is_ok()
                {
                    self.reset_counters();
                    tracing::warn!("probe failed, breaker reopened");
                    metrics::record_breaker_transition("open");
                }
            }
            // failures reported against an already-open breaker (e.g. from
            // calls admitted just before the flip) carry no new signal
            BreakerState::Open => {}
        }
    }

    fn reset_counters(&self) {
        self.failure_count.store(0, Ordering::Release);
        self.success_count.store(0, Ordering::Release);
        self.request_count.store(0, Ordering::Release);
    }
}

fn validate(config: &BreakerConfig) -> Result<(), DispatchError> {
    if config.failure_threshold == 0 {
        return Err(DispatchError::InvalidConfig(
            "breaker failure_threshold must be positive".to_string(),
        ));
    }
    if !(config.half_open_success_ratio > 0.0 && config.half_open_success_ratio <= 1.0) {
        return Err(DispatchError::InvalidConfig(format!(
            "breaker half_open_success_ratio must be in (0, 1], got {}",
            config.half_open_success_ratio
        )));
    }
    if config.open_duration_ms == 0 {
        return Err(DispatchError::InvalidConfig(
            "breaker open_duration_ms must be positive".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn validate_config(config: &BreakerConfig) -> Result<(), DispatchError> {
    validate(config)
}
