//! The view of a provider the strategy engine actually calls through: a
//! thin wrapper that routes `complete`/`complete_stream` through the
//! target's circuit breaker. Strategies never see the breaker directly —
//! they see an ordinary `Provider` whose calls can fail, matching spec
//! §4.3's "transparent to strategies" requirement.

use std::sync::Arc;

use async_trait::async_trait;

use crate::circuit_breaker::{CircuitBreaker, CircuitBreakerError};
use crate::error::GatewayError;
use crate::models::{ChatRequest, ChatResponse, ChunkStream};

use super::{DiscoverableProvider, EmbeddingProvider, ImageProvider, ModelInfo, Provider, ProxiableProvider, StreamingProvider};

pub struct BreakerWrappedProvider {
    inner: Arc<dyn Provider>,
    breaker: Arc<CircuitBreaker>,
}

impl BreakerWrappedProvider {
    pub fn new(inner: Arc<dyn Provider>, breaker: Arc<CircuitBreaker>) -> Arc<Self> {
        Arc::new(Self { inner, breaker })
    }

    fn unwrap_breaker_error(&self, err: CircuitBreakerError<GatewayError>) -> GatewayError {
        match err {
            CircuitBreakerError::CircuitOpen => {
                GatewayError::CircuitOpen(self.breaker.name().to_string())
            }
            CircuitBreakerError::OperationFailed(inner) => inner,
        }
    }
}

#[async_trait]
impl Provider for BreakerWrappedProvider {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn supported_models(&self) -> &[String] {
        self.inner.supported_models()
    }

    fn model_info(&self) -> &[ModelInfo] {
        self.inner.model_info()
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, GatewayError> {
        let inner = self.inner.clone();
        let request = request.clone();
        self.breaker
            .call(|| async move { inner.complete(&request).await })
            .await
            .map_err(|e| self.unwrap_breaker_error(e))
    }

    fn as_streaming(&self) -> Option<&dyn StreamingProvider> {
        self.inner.as_streaming().map(|_| self as &dyn StreamingProvider)
    }

    fn as_proxiable(&self) -> Option<&dyn ProxiableProvider> {
        self.inner.as_proxiable()
    }

    fn as_embedding(&self) -> Option<&dyn EmbeddingProvider> {
        self.inner.as_embedding()
    }

    fn as_image(&self) -> Option<&dyn ImageProvider> {
        self.inner.as_image()
    }

    fn as_discoverable(&self) -> Option<&dyn DiscoverableProvider> {
        self.inner.as_discoverable()
    }
}

#[async_trait]
impl StreamingProvider for BreakerWrappedProvider {
    async fn complete_stream(&self, request: &ChatRequest) -> Result<ChunkStream, GatewayError> {
        // The breaker only gates *opening* the stream, per spec §4.3: once
        // the upstream starts producing chunks, mid-stream failures are the
        // streaming dispatcher's concern, not the breaker's.
        let streaming = self
            .inner
            .as_streaming()
            .expect("as_streaming returned Some, so the inner provider supports streaming");
        let request = request.clone();
        self.breaker
            .call(|| async move { streaming.complete_stream(&request).await })
            .await
            .map_err(|e| self.unwrap_breaker_error(e))
    }
}
