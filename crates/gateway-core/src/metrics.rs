//! A thin metrics-sink interface. The core only records through it; an
//! actual exporter (Prometheus, StatsD, ...) is an external collaborator
//! wired up by `gateway-server`, matching how `kairos-rs`'s own
//! `services::metrics_store` stays a plain in-process counter rather than
//! owning an exporter itself.

use std::sync::atomic::{AtomicU64, Ordering};

pub trait MetricsSink: Send + Sync {
    fn record_request(&self, outcome: &str);
    fn record_duration_ms(&self, ms: u64);
    fn record_tokens(&self, provider: &str, prompt: u32, completion: u32);
    fn record_provider_error(&self, provider: &str);
}

pub struct NoopMetrics;

impl MetricsSink for NoopMetrics {
    fn record_request(&self, _outcome: &str) {}
    fn record_duration_ms(&self, _ms: u64) {}
    fn record_tokens(&self, _provider: &str, _prompt: u32, _completion: u32) {}
    fn record_provider_error(&self, _provider: &str) {}
}

/// A minimal in-memory recorder, useful for tests and for `gateway-cli
/// status` when no external metrics backend is configured.
#[derive(Default)]
pub struct InMemoryMetrics {
    requests_total: AtomicU64,
    requests_rejected: AtomicU64,
    requests_errored: AtomicU64,
    provider_errors: AtomicU64,
    total_duration_ms: AtomicU64,
    prompt_tokens: AtomicU64,
    completion_tokens: AtomicU64,
}

impl InMemoryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests_total(&self) -> u64 {
        self.requests_total.load(Ordering::Relaxed)
    }

    pub fn requests_rejected(&self) -> u64 {
        self.requests_rejected.load(Ordering::Relaxed)
    }

    pub fn requests_errored(&self) -> u64 {
        self.requests_errored.load(Ordering::Relaxed)
    }

    pub fn provider_errors(&self) -> u64 {
        self.provider_errors.load(Ordering::Relaxed)
    }

    pub fn total_tokens(&self) -> u64 {
        self.prompt_tokens.load(Ordering::Relaxed) + self.completion_tokens.load(Ordering::Relaxed)
    }
}

impl MetricsSink for InMemoryMetrics {
    fn record_request(&self, outcome: &str) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
        match outcome {
            "rejected" => {
                self.requests_rejected.fetch_add(1, Ordering::Relaxed);
            }
            "error" => {
                self.requests_errored.fetch_add(1, Ordering::Relaxed);
            }
            _ => {}
        }
    }

    fn record_duration_ms(&self, ms: u64) {
        self.total_duration_ms.fetch_add(ms, Ordering::Relaxed);
    }

    fn record_tokens(&self, _provider: &str, prompt: u32, completion: u32) {
        self.prompt_tokens.fetch_add(prompt as u64, Ordering::Relaxed);
        self.completion_tokens.fetch_add(completion as u64, Ordering::Relaxed);
    }

    fn record_provider_error(&self, _provider: &str) {
        self.provider_errors.fetch_add(1, Ordering::Relaxed);
    }
}
