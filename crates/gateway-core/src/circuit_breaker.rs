//! Three-state circuit breaker guarding a single target.
//!
//! Structurally this is `kairos-rs::services::circuit_breaker::CircuitBreaker`:
//! atomics for the state and counters, a lock only around the open-until
//! timestamp. The state machine itself follows spec §4.3 rather than the
//! teacher's thresholds: the Open→HalfOpen transition is evaluated lazily,
//! on the next `allow()`/`call()`, never by a background timer.

use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::config::CircuitBreakerSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CircuitState {
    Closed = 0,
    Open = 1,
    HalfOpen = 2,
}

impl From<u8> for CircuitState {
    fn from(value: u8) -> Self {
        match value {
            1 => CircuitState::Open,
            2 => CircuitState::HalfOpen,
            _ => CircuitState::Closed,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: u32,
    pub success_threshold: u32,
    pub timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        // Spec §4.3 defaults.
        Self {
            failure_threshold: 5,
            success_threshold: 1,
            timeout: Duration::from_secs(30),
        }
    }
}

impl From<CircuitBreakerSpec> for CircuitBreakerConfig {
    fn from(spec: CircuitBreakerSpec) -> Self {
        let default = CircuitBreakerConfig::default();
        Self {
            failure_threshold: spec.failure_threshold.filter(|v| *v > 0).unwrap_or(default.failure_threshold),
            success_threshold: spec.success_threshold.filter(|v| *v > 0).unwrap_or(default.success_threshold),
            timeout: spec
                .open_timeout_secs
                .filter(|v| *v > 0)
                .map(Duration::from_secs)
                .unwrap_or(default.timeout),
        }
    }
}

#[derive(Debug, Error)]
pub enum CircuitBreakerError<E> {
    #[error("circuit breaker open")]
    CircuitOpen,
    #[error(transparent)]
    OperationFailed(E),
}

/// Per-target breaker state. Cheap to clone via `Arc`; the Gateway keeps one
/// instance per target that declares a `circuit_breaker` block.
pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    state: AtomicU8,
    failure_count: AtomicU32,
    success_count: AtomicU32,
    open_until: RwLock<Option<Instant>>,
}

impl CircuitBreaker {
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            state: AtomicU8::new(CircuitState::Closed as u8),
            failure_count: AtomicU32::new(0),
            success_count: AtomicU32::new(0),
            open_until: RwLock::new(None),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> CircuitState {
        CircuitState::from(self.state.load(Ordering::Acquire))
    }

    pub fn failure_count(&self) -> u32 {
        self.failure_count.load(Ordering::Acquire)
    }

    pub fn success_count(&self) -> u32 {
        self.success_count.load(Ordering::Acquire)
    }

    /// Evaluates and performs the lazy Open→HalfOpen transition, then
    /// reports whether a call is currently allowed through.
    pub fn allow(&self) -> bool {
        match self.state() {
            CircuitState::Closed | CircuitState::HalfOpen => true,
            CircuitState::Open => {
                let past_deadline = {
                    let guard = self.open_until.read().unwrap();
                    matches!(*guard, Some(deadline) if Instant::now() >= deadline)
                };
                if past_deadline {
                    self.transition_to_half_open();
                    true
                } else {
                    false
                }
            }
        }
    }

    pub fn record_success(&self) {
        match self.state() {
            CircuitState::Closed => {
                self.failure_count.store(0, Ordering::Release);
            }
            CircuitState::HalfOpen => {
                let successes = self.success_count.fetch_add(1, Ordering::AcqRel) + 1;
                if successes >= self.config.success_threshold {
                    self.transition_to_closed();
                }
            }
            CircuitState::Open => {}
        }
    }

    pub fn record_failure(&self) {
        match self.state() {
            CircuitState::Closed => {
                let failures = self.failure_count.fetch_add(1, Ordering::AcqRel) + 1;
                if failures >= self.config.failure_threshold {
                    self.transition_to_open();
                }
            }
            CircuitState::HalfOpen => {
                self.transition_to_open();
            }
            CircuitState::Open => {}
        }
    }

    /// Runs `operation` if the breaker allows it, recording the outcome.
    /// Used directly by unary provider calls; streaming calls use `allow`
    /// and `record_success`/`record_failure` around stream establishment
    /// instead, since the operation there only covers opening the stream.
    pub async fn call<F, Fut, T, E>(&self, operation: F) -> Result<T, CircuitBreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
    {
        if !self.allow() {
            return Err(CircuitBreakerError::CircuitOpen);
        }
        match operation().await {
            Ok(value) => {
                self.record_success();
                Ok(value)
            }
            Err(err) => {
                self.record_failure();
                Err(CircuitBreakerError::OperationFailed(err))
            }
        }
    }

    fn transition_to_open(&self) {
        self.state.store(CircuitState::Open as u8, Ordering::Release);
        self.success_count.store(0, Ordering::Release);
        let deadline = Instant::now() + self.config.timeout;
        *self.open_until.write().unwrap() = Some(deadline);
        log::warn!("circuit breaker '{}' opened until {:?}", self.name, deadline);
    }

    fn transition_to_half_open(&self) {
        self.state
            .store(CircuitState::HalfOpen as u8, Ordering::Release);
        self.success_count.store(0, Ordering::Release);
        log::info!("circuit breaker '{}' half-open, probing", self.name);
    }

    fn transition_to_closed(&self) {
        self.state.store(CircuitState::Closed as u8, Ordering::Release);
        self.failure_count.store(0, Ordering::Release);
        self.success_count.store(0, Ordering::Release);
        log::info!("circuit breaker '{}' closed", self.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breaker(failure_threshold: u32, success_threshold: u32, timeout: Duration) -> CircuitBreaker {
        CircuitBreaker::new(
            "test",
            CircuitBreakerConfig {
                failure_threshold,
                success_threshold,
                timeout,
            },
        )
    }

    #[tokio::test]
    async fn opens_after_threshold_failures() {
        let cb = breaker(3, 1, Duration::from_secs(30));
        for _ in 0..2 {
            cb.record_failure();
            assert_eq!(cb.state(), CircuitState::Closed);
        }
        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::Open);
        assert!(!cb.allow());
    }

    #[tokio::test]
    async fn success_resets_failure_count_while_closed() {
        let cb = breaker(3, 1, Duration::from_secs(30));
        cb.record_failure();
        cb.record_failure();
        cb.record_success();
        assert_eq!(cb.failure_count(), 0);
        assert_eq!(cb.state(), CircuitState::Closed);
    }

    #[tokio::test]
    async fn transitions_to_half_open_after_timeout_elapses() {
        let cb = breaker(1, 1, Duration::from_millis(20));
        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::Open);
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(cb.allow());
        assert_eq!(cb.state(), CircuitState::HalfOpen);
    }

    #[tokio::test]
    async fn half_open_failure_reopens_immediately() {
        let cb = breaker(1, 5, Duration::from_millis(10));
        cb.record_failure();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(cb.allow());
        assert_eq!(cb.state(), CircuitState::HalfOpen);
        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::Open);
    }

    #[tokio::test]
    async fn half_open_closes_after_success_threshold() {
        let cb = breaker(1, 2, Duration::from_millis(10));
        cb.record_failure();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(cb.allow());
        cb.record_success();
        assert_eq!(cb.state(), CircuitState::HalfOpen);
        cb.record_success();
        assert_eq!(cb.state(), CircuitState::Closed);
    }

    #[tokio::test]
    async fn call_wraps_operation_outcome() {
        let cb = breaker(2, 1, Duration::from_secs(30));
        let ok: Result<_, CircuitBreakerError<&str>> =
            cb.call(|| async { Ok::<_, &str>(42) }).await;
        assert_eq!(ok.unwrap(), 42);

        let err: Result<i32, _> = cb.call(|| async { Err("boom") }).await;
        assert!(matches!(err, Err(CircuitBreakerError::OperationFailed("boom"))));
    }
}
