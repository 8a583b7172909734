//! The strategy engine (spec §4.2): pluggable policies for choosing which
//! target(s) serve a request, built once per config generation and cached
//! by the Gateway until the next reload or provider registration.

mod conditional;
mod fallback;
mod load_balance;
mod single;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{Config, StrategyMode, Target};
use crate::error::GatewayError;
use crate::models::{ChatRequest, ChatResponse};
use crate::provider::Provider;

/// Resolves a target's virtual key to a provider view, already wrapped with
/// its circuit breaker when one is configured. Captured at strategy-build
/// time so no component holds the Gateway's lock while a provider call is
/// in flight.
pub type ProviderLookupFn = Arc<dyn Fn(&str) -> Option<Arc<dyn Provider>> + Send + Sync>;

#[async_trait]
pub trait Strategy: Send + Sync {
    async fn execute(&self, request: &ChatRequest) -> Result<ChatResponse, GatewayError>;

    /// The ordered list of targets this strategy would consult for
    /// `request`, used by the streaming dispatcher (spec §4.6) which needs
    /// the same ordering without the retry loop.
    fn candidates(&self, request: &ChatRequest) -> Vec<Target>;
}

/// Builds the strategy named by `config.strategy.mode`, baking in a
/// snapshot of `config.targets` and the supplied lookup closure.
pub fn build(config: &Config, lookup: ProviderLookupFn) -> Result<Arc<dyn Strategy>, GatewayError> {
    let targets = config.targets.clone();
    match config.strategy.mode {
        StrategyMode::Single => Ok(Arc::new(single::SingleStrategy::new(targets, lookup)?)),
        StrategyMode::Fallback => Ok(Arc::new(fallback::FallbackStrategy::new(targets, lookup))),
        StrategyMode::LoadBalance => Ok(Arc::new(load_balance::LoadBalanceStrategy::new(targets, lookup))),
        StrategyMode::Conditional => Ok(Arc::new(conditional::ConditionalStrategy::new(
            targets,
            config.strategy.conditions.clone(),
            lookup,
        ))),
    }
}

/// Looks up the provider for `target` and confirms it supports the
/// requested model, translating the two failure cases the strategies all
/// share into the matching `GatewayError`.
fn resolve_provider(
    lookup: &ProviderLookupFn,
    target: &Target,
    model: &str,
) -> Result<Arc<dyn Provider>, GatewayError> {
    let provider = lookup(&target.virtual_key)
        .ok_or_else(|| GatewayError::UnknownModel(model.to_string()))?;
    if !provider.supports_model(model) {
        return Err(GatewayError::UnknownModel(model.to_string()));
    }
    Ok(provider)
}

