use async_trait::async_trait;

use crate::config::Target;
use crate::error::GatewayError;
use crate::models::{ChatRequest, ChatResponse};

use super::{resolve_provider, ProviderLookupFn, Strategy};

/// Routes every request to one fixed target. Config validation (spec §3)
/// guarantees `targets` is non-empty; `single` uses the first entry.
pub struct SingleStrategy {
    target: Target,
    lookup: ProviderLookupFn,
}

impl SingleStrategy {
    pub fn new(targets: Vec<Target>, lookup: ProviderLookupFn) -> Result<Self, GatewayError> {
        let target = targets
            .into_iter()
            .next()
            .ok_or_else(|| GatewayError::Config("single strategy requires one target".into()))?;
        Ok(Self { target, lookup })
    }
}

#[async_trait]
impl Strategy for SingleStrategy {
    async fn execute(&self, request: &ChatRequest) -> Result<ChatResponse, GatewayError> {
        let provider = resolve_provider(&self.lookup, &self.target, &request.model)?;
        provider.complete(request).await
    }

    fn candidates(&self, _request: &ChatRequest) -> Vec<Target> {
        vec![self.target.clone()]
    }
}
