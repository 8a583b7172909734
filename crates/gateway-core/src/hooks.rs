//! Fire-and-forget event hooks (spec §4.1's `AddHook`). Each registered
//! hook runs in its own detached `tokio::spawn` task so a slow or failing
//! hook (e.g. a webhook call) never adds latency to the request path.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct HookPayload {
    pub trace_id: String,
    pub provider: Option<String>,
    pub model: String,
    pub latency_ms: u64,
    pub status: String,
    pub tokens_in: u32,
    pub tokens_out: u32,
    pub timestamp: DateTime<Utc>,
}

pub type HookFn = Arc<dyn Fn(String, HookPayload) -> BoxFuture<'static, ()> + Send + Sync>;

#[derive(Default, Clone)]
pub struct HookRegistry {
    hooks: Vec<HookFn>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, hook: HookFn) {
        self.hooks.push(hook);
    }

    /// Dispatches `event`/`payload` to every registered hook as a detached
    /// task; does not wait for any of them to finish.
    pub fn publish(&self, event: &str, payload: HookPayload) {
        for hook in &self.hooks {
            let hook = hook.clone();
            let event = event.to_string();
            let payload = payload.clone();
            tokio::spawn(async move {
                hook(event, payload).await;
            });
        }
    }
}
