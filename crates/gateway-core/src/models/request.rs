use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub role: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// An OpenAI-compatible chat completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logit_bias: Option<HashMap<String, f32>>,
    #[serde(default)]
    pub stream: bool,
}

impl ChatRequest {
    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.model.trim().is_empty() {
            return Err(GatewayError::Validation("model must not be empty".into()));
        }
        if self.messages.is_empty() {
            return Err(GatewayError::Validation(
                "messages must contain at least one entry".into(),
            ));
        }
        if let Some(n) = self.n {
            if n == 0 {
                return Err(GatewayError::Validation("n must be positive".into()));
            }
        }
        Ok(())
    }

    /// A stable fingerprint used by cache-style plugins: `(model, sorted
    /// messages)` per spec §4.4, so two requests carrying the same
    /// messages in different order collide to the same cache key.
    pub fn fingerprint(&self) -> String {
        let mut parts: Vec<String> = self.messages.iter().map(|m| format!("{}\u{1}{}", m.role, m.content)).collect();
        parts.sort_unstable();

        let mut buf = String::with_capacity(64);
        buf.push_str(&self.model);
        for part in parts {
            buf.push('\u{1}');
            buf.push_str(&part);
        }
        buf
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingRequest {
    pub model: String,
    pub input: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl EmbeddingRequest {
    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.model.trim().is_empty() {
            return Err(GatewayError::Validation("model must not be empty".into()));
        }
        if self.input.is_empty() {
            return Err(GatewayError::Validation("input must not be empty".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRequest {
    pub model: String,
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

impl ImageRequest {
    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.model.trim().is_empty() {
            return Err(GatewayError::Validation("model must not be empty".into()));
        }
        if self.prompt.trim().is_empty() {
            return Err(GatewayError::Validation("prompt must not be empty".into()));
        }
        Ok(())
    }
}
