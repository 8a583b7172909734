//! Two small guardrail plugins: reject requests containing a blocked word,
//! and reject requests asking for more completion tokens than a configured
//! ceiling.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::GatewayError;

use super::{Plugin, PluginContext, PluginKind};

#[derive(Deserialize)]
struct WordFilterConfig {
    blocked_words: Vec<String>,
}

pub struct WordFilterPlugin {
    blocked_words: Vec<String>,
}

impl WordFilterPlugin {
    pub fn from_config(config: &serde_json::Value) -> Result<Self, GatewayError> {
        let parsed: WordFilterConfig = serde_json::from_value(config.clone())
            .map_err(|e| GatewayError::Config(format!("invalid word_filter config: {e}")))?;
        Ok(Self {
            blocked_words: parsed.blocked_words.into_iter().map(|w| w.to_lowercase()).collect(),
        })
    }
}

#[async_trait]
impl Plugin for WordFilterPlugin {
    fn name(&self) -> &str {
        "word_filter"
    }

    fn kind(&self) -> PluginKind {
        PluginKind::Guardrail
    }

    async fn before_request(&self, ctx: &mut PluginContext) -> Result<(), GatewayError> {
        let lowered: String = ctx
            .request
            .messages
            .iter()
            .map(|m| m.content.to_lowercase())
            .collect::<Vec<_>>()
            .join(" ");
        if let Some(word) = self.blocked_words.iter().find(|w| lowered.contains(w.as_str())) {
            ctx.reject(format!("blocked word detected: {word}"));
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct MaxTokenConfig {
    max_tokens: u32,
}

pub struct MaxTokenPlugin {
    max_tokens: u32,
}

impl MaxTokenPlugin {
    pub fn from_config(config: &serde_json::Value) -> Result<Self, GatewayError> {
        let parsed: MaxTokenConfig = serde_json::from_value(config.clone())
            .map_err(|e| GatewayError::Config(format!("invalid max_token config: {e}")))?;
        Ok(Self { max_tokens: parsed.max_tokens })
    }
}

#[async_trait]
impl Plugin for MaxTokenPlugin {
    fn name(&self) -> &str {
        "max_token"
    }

    fn kind(&self) -> PluginKind {
        PluginKind::Guardrail
    }

    async fn before_request(&self, ctx: &mut PluginContext) -> Result<(), GatewayError> {
        if let Some(requested) = ctx.request.max_tokens {
            if requested > self.max_tokens {
                ctx.reject(format!(
                    "requested max_tokens {requested} exceeds configured ceiling {}",
                    self.max_tokens
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChatRequest, Message};

    fn request(content: &str) -> ChatRequest {
        ChatRequest {
            model: "gpt-x".into(),
            messages: vec![Message { role: "user".into(), content: content.into(), name: None }],
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

    #[tokio::test]
    async fn word_filter_rejects_blocked_content() {
        let plugin = WordFilterPlugin { blocked_words: vec!["forbidden".into()] };
        let mut ctx = PluginContext::new(request("this is forbidden content"));
        plugin.before_request(&mut ctx).await.unwrap();
        assert!(ctx.reject);
    }

    #[tokio::test]
    async fn word_filter_allows_clean_content() {
        let plugin = WordFilterPlugin { blocked_words: vec!["forbidden".into()] };
        let mut ctx = PluginContext::new(request("hello there"));
        plugin.before_request(&mut ctx).await.unwrap();
        assert!(!ctx.reject);
    }

    #[tokio::test]
    async fn max_token_rejects_over_ceiling() {
        let plugin = MaxTokenPlugin { max_tokens: 100 };
        let mut ctx = PluginContext::new(request("hi"));
        ctx.request.max_tokens = Some(500);
        plugin.before_request(&mut ctx).await.unwrap();
        assert!(ctx.reject);
    }
}
