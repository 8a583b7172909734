//! A generic OpenAI-wire-compatible HTTP provider: talks to any upstream
//! that speaks the `/chat/completions`, `/embeddings`, `/images/generations`
//! shape (OpenAI itself, Azure OpenAI, local vLLM/Ollama gateways, etc).
//!
//! Grounded on `kairos-rs::services::http`'s forwarding pattern (build a
//! `reqwest::Client`, forward the body, map transport errors into the
//! domain error type) with the streaming half grounded on the
//! `eventsource-stream`/`async-stream` combination used for SSE decoding
//! elsewhere in the reference pack.

use std::collections::HashMap;
use std::time::Duration;

use async_stream::try_stream;
use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures_util::StreamExt;
use reqwest::Client;

use crate::error::GatewayError;
use crate::models::{
    ChatRequest, ChatResponse, ChunkStream, EmbeddingRequest, EmbeddingResponse, ImageRequest, ImageResponse, StreamChunk,
};

use super::{DiscoverableProvider, EmbeddingProvider, ImageProvider, ModelInfo, Provider, ProxiableProvider, StreamingProvider};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct HttpProviderConfig {
    pub name: String,
    pub base_url: String,
    pub api_key: Option<String>,
    pub models: Vec<String>,
    pub model_info: Vec<ModelInfo>,
}

pub struct HttpProvider {
    config: HttpProviderConfig,
    client: Client,
}

impl HttpProvider {
    pub fn new(config: HttpProviderConfig) -> Self {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .expect("reqwest client configuration is valid");
        Self { config, client }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    fn provider_error(&self, message: impl Into<String>) -> GatewayError {
        GatewayError::Provider {
            provider: self.config.name.clone(),
            message: message.into(),
        }
    }
}

#[async_trait]
impl Provider for HttpProvider {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn supported_models(&self) -> &[String] {
        &self.config.models
    }

    fn model_info(&self) -> &[ModelInfo] {
        &self.config.model_info
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, GatewayError> {
        let mut body = request.clone();
        body.stream = false;

        let response = self
            .auth(self.client.post(self.url("/chat/completions")).json(&body))
            .send()
            .await
            .map_err(|e| self.provider_error(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(self.provider_error(format!("upstream returned {status}: {text}")));
        }

        let mut parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| self.provider_error(format!("invalid response body: {e}")))?;
        parsed.provider = self.config.name.clone();
        parsed.normalize();
        Ok(parsed)
    }

    fn as_streaming(&self) -> Option<&dyn StreamingProvider> {
        Some(self)
    }

    fn as_proxiable(&self) -> Option<&dyn ProxiableProvider> {
        Some(self)
    }

    fn as_embedding(&self) -> Option<&dyn EmbeddingProvider> {
        Some(self)
    }

    fn as_image(&self) -> Option<&dyn ImageProvider> {
        Some(self)
    }

    fn as_discoverable(&self) -> Option<&dyn DiscoverableProvider> {
        Some(self)
    }
}

#[async_trait]
impl StreamingProvider for HttpProvider {
    async fn complete_stream(&self, request: &ChatRequest) -> Result<ChunkStream, GatewayError> {
        let mut body = request.clone();
        body.stream = true;

        let response = self
            .auth(self.client.post(self.url("/chat/completions")).json(&body))
            .send()
            .await
            .map_err(|e| self.provider_error(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(self.provider_error(format!("upstream returned {status}: {text}")));
        }

        let provider_name = self.config.name.clone();
        let mut source = response.bytes_stream().eventsource();

        let stream = try_stream! {
            while let Some(event) = source.next().await {
                let event = event.map_err(|e| GatewayError::Provider {
                    provider: provider_name.clone(),
                    message: format!("malformed upstream event: {e}"),
                })?;
                if event.data == "[DONE]" {
                    break;
                }
                let mut chunk: StreamChunk = serde_json::from_str(&event.data).map_err(|e| GatewayError::Provider {
                    provider: provider_name.clone(),
                    message: format!("invalid stream chunk: {e}"),
                })?;
                chunk.provider = provider_name.clone();
                yield chunk;
            }
        };

        Ok(Box::pin(stream))
    }
}

impl ProxiableProvider for HttpProvider {
    fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn auth_headers(&self) -> HashMap<String, String> {
        let mut headers = HashMap::new();
        if let Some(key) = &self.config.api_key {
            headers.insert("Authorization".to_string(), format!("Bearer {key}"));
        }
        headers
    }
}

#[async_trait]
impl EmbeddingProvider for HttpProvider {
    async fn embed(&self, request: &EmbeddingRequest) -> Result<EmbeddingResponse, GatewayError> {
        let response = self
            .auth(self.client.post(self.url("/embeddings")).json(request))
            .send()
            .await
            .map_err(|e| self.provider_error(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(self.provider_error(format!("upstream returned {status}: {text}")));
        }

        let mut parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| self.provider_error(format!("invalid response body: {e}")))?;
        parsed.provider = self.config.name.clone();
        Ok(parsed)
    }
}

#[async_trait]
impl ImageProvider for HttpProvider {
    async fn generate_image(&self, request: &ImageRequest) -> Result<ImageResponse, GatewayError> {
        let response = self
            .auth(self.client.post(self.url("/images/generations")).json(request))
            .send()
            .await
            .map_err(|e| self.provider_error(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(self.provider_error(format!("upstream returned {status}: {text}")));
        }

        let mut parsed: ImageResponse = response
            .json()
            .await
            .map_err(|e| self.provider_error(format!("invalid response body: {e}")))?;
        parsed.provider = self.config.name.clone();
        Ok(parsed)
    }
}

#[async_trait]
impl DiscoverableProvider for HttpProvider {
    async fn discover_models(&self) -> Result<Vec<ModelInfo>, GatewayError> {
        #[derive(serde::Deserialize)]
        struct ModelsList {
            data: Vec<ModelEntry>,
        }
        #[derive(serde::Deserialize)]
        struct ModelEntry {
            id: String,
            #[serde(default = "unknown_owner")]
            owned_by: String,
        }
        fn unknown_owner() -> String {
            "unknown".to_string()
        }

        let response = self
            .auth(self.client.get(self.url("/models")))
            .send()
            .await
            .map_err(|e| self.provider_error(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(self.provider_error(format!("model discovery returned {status}")));
        }

        let parsed: ModelsList = response
            .json()
            .await
            .map_err(|e| self.provider_error(format!("invalid discovery response: {e}")))?;

        Ok(parsed
            .data
            .into_iter()
            .map(|m| ModelInfo {
                id: m.id,
                owned_by: m.owned_by,
                context_window: None,
            })
            .collect())
    }
}
