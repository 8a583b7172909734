use async_trait::async_trait;

use crate::config::{Condition, Target};
use crate::error::GatewayError;
use crate::models::{ChatRequest, ChatResponse};

use super::{resolve_provider, ProviderLookupFn, Strategy};

/// Evaluates `conditions` in declared order and routes to the first match's
/// target; falls back to the first configured target when nothing matches.
/// No retry, no fallback chain — exactly one attempt against one target.
pub struct ConditionalStrategy {
    targets: Vec<Target>,
    conditions: Vec<Condition>,
    lookup: ProviderLookupFn,
}

impl ConditionalStrategy {
    pub fn new(targets: Vec<Target>, conditions: Vec<Condition>, lookup: ProviderLookupFn) -> Self {
        Self { targets, conditions, lookup }
    }

    fn select(&self, model: &str) -> Option<&Target> {
        for condition in &self.conditions {
            if condition.matches(model) {
                if let Some(target) = self.targets.iter().find(|t| t.virtual_key == condition.target) {
                    return Some(target);
                }
            }
        }
        self.targets.first()
    }
}

#[async_trait]
impl Strategy for ConditionalStrategy {
    async fn execute(&self, request: &ChatRequest) -> Result<ChatResponse, GatewayError> {
        let target = self
            .select(&request.model)
            .ok_or_else(|| GatewayError::UnknownModel(request.model.clone()))?;
        let provider = resolve_provider(&self.lookup, target, &request.model)?;
        provider.complete(request).await
    }

    /// The matched target first, then every other configured target in
    /// declared order, so the streaming dispatcher can fall through a
    /// non-streaming match to a streaming-capable sibling (spec §4.6).
    fn candidates(&self, request: &ChatRequest) -> Vec<Target> {
        let Some(selected) = self.select(&request.model) else {
            return Vec::new();
        };
        let mut ordered = vec![selected.clone()];
        for target in &self.targets {
            if target.virtual_key != selected.virtual_key {
                ordered.push(target.clone());
            }
        }
        ordered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::config::ConditionKey;

    fn empty_lookup() -> ProviderLookupFn {
        Arc::new(|_: &str| None)
    }

    fn targets() -> Vec<Target> {
        vec![
            Target { virtual_key: "default".into(), weight: 1.0, retry: None, circuit_breaker: None },
            Target { virtual_key: "vision".into(), weight: 1.0, retry: None, circuit_breaker: None },
        ]
    }

    #[test]
    fn first_matching_condition_wins() {
        let strategy = ConditionalStrategy::new(
            targets(),
            vec![Condition { key: ConditionKey::ModelPrefix, value: "gpt-4-vision".into(), target: "vision".into() }],
            empty_lookup(),
        );
        assert_eq!(strategy.select("gpt-4-vision-preview").unwrap().virtual_key, "vision");
    }

    #[test]
    fn no_match_falls_back_to_first_target() {
        let strategy = ConditionalStrategy::new(
            targets(),
            vec![Condition { key: ConditionKey::Model, value: "gpt-4-vision".into(), target: "vision".into() }],
            empty_lookup(),
        );
        assert_eq!(strategy.select("gpt-3.5-turbo").unwrap().virtual_key, "default");
    }
}
