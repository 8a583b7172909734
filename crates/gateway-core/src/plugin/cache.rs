//! A bounded, TTL-expiring response cache plugin. On a hit, `before_request`
//! sets `skip` (not `reject`) so the request still reaches the caller's
//! response path, just without invoking the strategy engine — the Gateway
//! treats a plugin-supplied `ctx.response` as authoritative when present.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::GatewayError;
use crate::models::ChatResponse;

use super::{Plugin, PluginContext, PluginKind};

#[derive(Deserialize)]
struct CacheConfig {
    #[serde(default = "default_capacity")]
    capacity: usize,
    #[serde(default = "default_ttl_secs")]
    ttl_secs: u64,
}

fn default_capacity() -> usize {
    256
}

fn default_ttl_secs() -> u64 {
    60
}

struct Entry {
    response: ChatResponse,
    expires_at: Instant,
}

pub struct ResponseCachePlugin {
    capacity: usize,
    ttl: Duration,
    store: Mutex<HashMap<String, Entry>>,
}

impl ResponseCachePlugin {
    pub fn from_config(config: &serde_json::Value) -> Result<Self, GatewayError> {
        let parsed: CacheConfig = serde_json::from_value(config.clone())
            .map_err(|e| GatewayError::Config(format!("invalid response_cache config: {e}")))?;
        Ok(Self {
            capacity: parsed.capacity,
            ttl: Duration::from_secs(parsed.ttl_secs),
            store: Mutex::new(HashMap::new()),
        })
    }

    fn key(ctx: &PluginContext) -> String {
        ctx.request.fingerprint()
    }
}

#[async_trait]
impl Plugin for ResponseCachePlugin {
    fn name(&self) -> &str {
        "response_cache"
    }

    fn kind(&self) -> PluginKind {
        PluginKind::Cache
    }

    async fn before_request(&self, ctx: &mut PluginContext) -> Result<(), GatewayError> {
        let key = Self::key(ctx);
        let mut store = self.store.lock().unwrap();
        if let Some(entry) = store.get(&key) {
            if entry.expires_at > Instant::now() {
                ctx.response = Some(entry.response.clone());
                ctx.skip = true;
                return Ok(());
            }
            store.remove(&key);
        }
        Ok(())
    }

    async fn after_request(&self, ctx: &mut PluginContext) -> Result<(), GatewayError> {
        let Some(response) = ctx.response.clone() else {
            return Ok(());
        };
        let key = Self::key(ctx);
        let mut store = self.store.lock().unwrap();
        // Reject-not-evict: at capacity, new entries are simply not cached
        // rather than evicting an arbitrary existing one.
        if store.len() >= self.capacity && !store.contains_key(&key) {
            return Ok(());
        }
        store.insert(
            key,
            Entry { response, expires_at: Instant::now() + self.ttl },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChatRequest, Choice, Message, Usage};

    fn request() -> ChatRequest {
        ChatRequest {
            model: "gpt-x".into(),
            messages: vec![Message { role: "user".into(), content: "hi".into(), name: None }],
            max_tokens: None,
            temperature: None,
            top_p: None,
            n: None,
            stop: None,
            presence_penalty: None,
            frequency_penalty: None,
            seed: None,
            user: None,
            logit_bias: None,
            stream: false,
        }
    }

    fn response() -> ChatResponse {
        ChatResponse {
            id: "1".into(),
            object: "chat.completion".into(),
            created: 0,
            provider: "mock".into(),
            model: "gpt-x".into(),
            choices: vec![Choice {
                index: 0,
                message: Message { role: "assistant".into(), content: "cached".into(), name: None },
                finish_reason: Some("stop".into()),
            }],
            usage: Usage::default(),
        }
    }

    #[tokio::test]
    async fn caches_and_serves_hit() {
        let plugin = ResponseCachePlugin::from_config(&serde_json::json!({"capacity": 10, "ttl_secs": 60})).unwrap();
        let mut ctx = PluginContext::new(request());
        ctx.response = Some(response());
        plugin.after_request(&mut ctx).await.unwrap();

        let mut second = PluginContext::new(request());
        plugin.before_request(&mut second).await.unwrap();
        assert!(second.skip);
        assert!(second.response.is_some());
    }

    #[tokio::test]
    async fn expired_entries_are_not_served() {
        let plugin = ResponseCachePlugin::from_config(&serde_json::json!({"capacity": 10, "ttl_secs": 0})).unwrap();
        let mut ctx = PluginContext::new(request());
        ctx.response = Some(response());
        plugin.after_request(&mut ctx).await.unwrap();

        tokio::time::sleep(Duration::from_millis(5)).await;

        let mut second = PluginContext::new(request());
        plugin.before_request(&mut second).await.unwrap();
        assert!(!second.skip);
    }
}
