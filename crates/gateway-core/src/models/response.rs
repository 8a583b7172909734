use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::request::Message;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_read_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_write_tokens: Option<u32>,
}

impl Usage {
    pub fn total(&self) -> u32 {
        self.prompt_tokens + self.completion_tokens
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    pub index: u32,
    pub message: Message,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// An OpenAI-compatible chat completion response. `provider` records which
/// backend actually served the request, independent of the virtual key the
/// caller addressed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default = "default_object")]
    pub object: String,
    #[serde(default)]
    pub created: i64,
    pub provider: String,
    pub model: String,
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Usage,
}

fn default_object() -> String {
    "chat.completion".to_string()
}

impl ChatResponse {
    /// Fills in fields an upstream provider may have left blank so callers
    /// always see a well-formed envelope, mirroring the normalization a
    /// hand-rolled HTTP forwarder would otherwise skip.
    pub fn normalize(&mut self) {
        if self.id.is_empty() {
            self.id = format!("chatcmpl-{}", Uuid::new_v4());
        }
        if self.object.is_empty() {
            self.object = default_object();
        }
        if self.created == 0 {
            self.created = chrono::Utc::now().timestamp();
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingData {
    pub index: u32,
    pub embedding: Vec<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingResponse {
    #[serde(default = "default_embedding_object")]
    pub object: String,
    pub provider: String,
    pub model: String,
    pub data: Vec<EmbeddingData>,
    #[serde(default)]
    pub usage: Usage,
}

fn default_embedding_object() -> String {
    "list".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub b64_json: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageResponse {
    #[serde(default)]
    pub created: i64,
    pub provider: String,
    pub data: Vec<ImageData>,
}
