//! Provider abstraction (spec §4.5): a small base trait plus optional
//! capability traits exposed through accessor methods. A provider that
//! doesn't support streaming simply returns `None` from `as_streaming`;
//! callers check the capability instead of downcasting through `Any`,
//! which keeps every call site exhaustive and panic-free.

pub mod breaker_wrapped;
pub mod http_provider;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;
pub mod registry;

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::GatewayError;
use crate::models::{ChatRequest, ChatResponse, ChunkStream, EmbeddingRequest, EmbeddingResponse, ImageRequest, ImageResponse};

pub use breaker_wrapped::BreakerWrappedProvider;
pub use registry::{ProviderRegistry, Registry};

/// Mirrors the `data[]` entries of `GET /v1/models`'s `{object:"list",
/// data:[...]}` envelope (spec §6).
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub id: String,
    pub owned_by: String,
    pub context_window: Option<u32>,
}

#[async_trait]
pub trait Provider: Send + Sync {
    fn name(&self) -> &str;
    fn supported_models(&self) -> &[String];
    fn model_info(&self) -> &[ModelInfo];

    fn supports_model(&self, model: &str) -> bool {
        self.supported_models().iter().any(|m| m == model)
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, GatewayError>;

    fn as_streaming(&self) -> Option<&dyn StreamingProvider> {
        None
    }
    fn as_proxiable(&self) -> Option<&dyn ProxiableProvider> {
        None
    }
    fn as_embedding(&self) -> Option<&dyn EmbeddingProvider> {
        None
    }
    fn as_image(&self) -> Option<&dyn ImageProvider> {
        None
    }
    fn as_discoverable(&self) -> Option<&dyn DiscoverableProvider> {
        None
    }
}

#[async_trait]
pub trait StreamingProvider: Provider {
    async fn complete_stream(&self, request: &ChatRequest) -> Result<ChunkStream, GatewayError>;
}

/// A provider that can be addressed as a raw HTTP pass-through target
/// (spec §4.5's "proxiable" capability), e.g. for the `/v1/*` catch-all
/// forwarding route.
pub trait ProxiableProvider: Provider {
    fn base_url(&self) -> &str;
    fn auth_headers(&self) -> HashMap<String, String>;
}

#[async_trait]
pub trait EmbeddingProvider: Provider {
    async fn embed(&self, request: &EmbeddingRequest) -> Result<EmbeddingResponse, GatewayError>;
}

#[async_trait]
pub trait ImageProvider: Provider {
    async fn generate_image(&self, request: &ImageRequest) -> Result<ImageResponse, GatewayError>;
}

#[async_trait]
pub trait DiscoverableProvider: Provider {
    async fn discover_models(&self) -> Result<Vec<ModelInfo>, GatewayError>;
}
