//! One-call orchestration across balancer, breaker and retry policy.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use uuid::Uuid;

use crate::balancer::{FeatureCode, LoadBalance, StrategyRegistry};
use crate::breaker::BreakerRegistry;
use crate::config::DispatchConfig;
use crate::discovery::Address;
use crate::dispatch::result::{RpcResult, CODE_UPSTREAM_FAILURE};
use crate::dispatch::retry::{RetryPolicy, TransportError};
use crate::error::DispatchError;
use crate::observability::metrics;

/// Orchestrates one outbound call: select address, consult the breaker,
/// invoke the transport under the retry policy, record the outcome.
pub struct CallDispatcher {
    balancer: Arc<dyn LoadBalance>,
    breakers: Arc<BreakerRegistry>,
    retry: RetryPolicy,
}

impl CallDispatcher {
    pub fn new(
        balancer: Arc<dyn LoadBalance>,
        breakers: Arc<BreakerRegistry>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            balancer,
            breakers,
            retry,
        }
    }

    /// Assemble a dispatcher from validated configuration, building the
    /// configured strategy through the registry map.
    pub fn from_config(
        config: &DispatchConfig,
        strategies: &StrategyRegistry,
    ) -> Result<Self, DispatchError> {
        let balancer = strategies.build(&config.balancer)?;
        let breakers = Arc::new(BreakerRegistry::new(config.breaker)?);
        let retry = RetryPolicy::from_config(&config.retry)?;
        Ok(Self::new(balancer, breakers, retry))
    }

    /// The breaker registry backing this dispatcher, for observability.
    pub fn breakers(&self) -> &Arc<BreakerRegistry> {
        &self.breakers
    }

    /// Dispatch one call. `invoke` is the external transport: it receives
    /// the selected address and resolves to a response or a transport
    /// error. Every expected failure mode comes back as an `RpcResult`.
    pub async fn dispatch<F, Fut>(
        &self,
        service: &str,
        code: &FeatureCode,
        addresses: &[Address],
        invoke: F,
    ) -> RpcResult
    where
        F: Fn(Address) -> Fut,
        Fut: Future<Output = Result<RpcResult, TransportError>>,
    {
        let call_id = Uuid::new_v4();

        let Some(address) = self.balancer.select(service, addresses, code) else {
            tracing::debug!(%call_id, service, "no candidate address");
            return RpcResult::unavailable(service);
        };

        let breaker = self.breakers.get(&address);
        if !breaker.allow_request() {
            tracing::warn!(%call_id, service, %address, "breaker open, failing fast");
            metrics::record_fast_fail("breaker_open");
            return RpcResult::rejected(address.as_str());
        }

        let started = Instant::now();
        let mut attempt = 0u32;
        let outcome = loop {
            attempt += 1;
            let outcome = invoke(address.clone()).await;
            if attempt >= self.retry.max_attempts || !self.retry.should_retry(&outcome) {
                break outcome;
            }
            tracing::debug!(
                %call_id,
                service,
                %address,
                attempt,
                backoff_ms = self.retry.backoff.as_millis() as u64,
                "attempt failed, retrying"
            );
            metrics::record_retry(service);
            tokio::time::sleep(self.retry.backoff).await;
        };
        let latency_ms = started.elapsed().as_millis() as u64;

        let result = match outcome {
            Ok(result) => result,
            Err(err) => {
                tracing::warn!(%call_id, service, %address, error = %err, attempts = attempt, "transport failed");
                RpcResult::with_status(CODE_UPSTREAM_FAILURE, err.to_string())
            }
        };

        // the outcome is recorded exactly once, after the last attempt
        let healthy = !result.is_breaker_failure();
        if healthy {
            breaker.record_success();
        } else {
            breaker.record_failure();
        }
        self.balancer
            .feedback(service, &address, latency_ms, healthy);

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::balancer::round_robin::RoundRobin;
    use crate::config::BreakerConfig;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn dispatcher(retry: RetryPolicy) -> CallDispatcher {
        let breakers = Arc::new(
            BreakerRegistry::new(BreakerConfig {
                failure_threshold: 3,
                half_open_success_ratio: 0.5,
                open_duration_ms: 60_000,
            })
            .unwrap(),
        );
        CallDispatcher::new(Arc::new(RoundRobin::new()), breakers, retry)
    }

    fn addrs(n: usize) -> Vec<Address> {
        (0..n).map(|i| Address::new(format!("10.0.0.{}:9000", i + 1))).collect()
    }

    #[tokio::test]
    async fn test_empty_address_list_is_unavailable() {
        let d = dispatcher(RetryPolicy::none());
        let result = d
            .dispatch("orders", &FeatureCode::Hashed(1), &[], |_| async {
                Ok(RpcResult::ok(None))
            })
            .await;
        assert_eq!(result.code, 503);
        assert!(!result.success);
    }

    #[tokio::test]
    async fn test_successful_call_passes_through() {
        let d = dispatcher(RetryPolicy::none());
        let result = d
            .dispatch("orders", &FeatureCode::Hashed(1), &addrs(1), |addr| async move {
                assert_eq!(addr.as_str(), "10.0.0.1:9000");
                Ok(RpcResult::ok(json!({"total": 42})))
            })
            .await;
        assert!(result.success);
        assert_eq!(result.data, Some(json!({"total": 42})));
    }

    #[tokio::test]
    async fn test_retries_on_5xx_then_succeeds() {
        let d = dispatcher(RetryPolicy::new(3, std::time::Duration::from_millis(1)).unwrap());
        let calls = AtomicU32::new(0);
        let result = d
            .dispatch("orders", &FeatureCode::Hashed(1), &addrs(1), |_| {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Ok(RpcResult::with_status(502, "bad gateway"))
                    } else {
                        Ok(RpcResult::ok(None))
                    }
                }
            })
            .await;
        assert!(result.success);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_attempts_are_bounded() {
        let d = dispatcher(RetryPolicy::new(2, std::time::Duration::from_millis(1)).unwrap());
        let calls = AtomicU32::new(0);
        let result = d
            .dispatch("orders", &FeatureCode::Hashed(1), &addrs(1), |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(TransportError::retryable("connection reset")) }
            })
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(result.code, 500);
        assert!(!result.success);
    }

    #[tokio::test]
    async fn test_fatal_transport_error_is_not_retried() {
        let d = dispatcher(RetryPolicy::new(5, std::time::Duration::from_millis(1)).unwrap());
        let calls = AtomicU32::new(0);
        let result = d
            .dispatch("orders", &FeatureCode::Hashed(1), &addrs(1), |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(TransportError::fatal("bad handshake")) }
            })
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(result.code, 500);
    }

    #[tokio::test]
    async fn test_breaker_opens_then_fast_fails() {
        let d = dispatcher(RetryPolicy::none());
        let addresses = addrs(1);
        for _ in 0..3 {
            let result = d
                .dispatch("orders", &FeatureCode::Hashed(1), &addresses, |_| async {
                    Ok(RpcResult::with_status(500, "boom"))
                })
                .await;
            assert_eq!(result.code, 500);
        }

        // breaker is now open; the transport must not be touched
        let result = d
            .dispatch("orders", &FeatureCode::Hashed(1), &addresses, |_| async {
                panic!("transport must not be invoked while open");
            })
            .await;
        assert_eq!(result.code, 429);
        assert!(!result.success);
    }

    #[tokio::test]
    async fn test_4xx_does_not_trip_breaker() {
        let d = dispatcher(RetryPolicy::none());
        let addresses = addrs(1);
        for _ in 0..10 {
            let result = d
                .dispatch("orders", &FeatureCode::Hashed(1), &addresses, |_| async {
                    Ok(RpcResult::with_status(404, "no such order"))
                })
                .await;
            // application error surfaces unchanged and never opens the
            // breaker
            assert_eq!(result.code, 404);
        }
        let result = d
            .dispatch("orders", &FeatureCode::Hashed(1), &addresses, |_| async {
                Ok(RpcResult::ok(None))
            })
            .await;
        assert!(result.success);
    }

    #[tokio::test]
    async fn test_adaptive_feedback_receives_outcome() {
        use crate::balancer::adaptive::AdaptiveWeighted;

        let adaptive = Arc::new(AdaptiveWeighted::new(100, 0.05, 0.5));
        let breakers = Arc::new(BreakerRegistry::new(BreakerConfig::default()).unwrap());
        let d = CallDispatcher::new(adaptive.clone(), breakers, RetryPolicy::none());
        let addresses = addrs(1);

        for _ in 0..50 {
            d.dispatch("orders", &FeatureCode::Hashed(1), &addresses, |_| async {
                Ok(RpcResult::with_status(500, "boom"))
            })
            .await;
        }
        let weight = adaptive.weight_of("orders", &addresses[0]).unwrap();
        assert!(weight < 1.0, "failures must have lowered the weight, got {weight}");
    }
}
