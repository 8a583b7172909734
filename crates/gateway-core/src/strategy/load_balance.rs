use async_trait::async_trait;
use rand::Rng;

use crate::config::Target;
use crate::error::GatewayError;
use crate::models::{ChatRequest, ChatResponse};

use super::{resolve_provider, ProviderLookupFn, Strategy};

/// Picks a target by genuine weighted-random selection on every call (spec
/// §4.2, §8 property 7: empirical frequency converges to `w_i / Σw_j`).
///
/// `kairos-rs::services::load_balancer::WeightedBalancer` builds an expanded
/// list and round-robins over it deterministically; that doesn't satisfy
/// the convergence property the tests check here, so this is grounded on
/// the teacher's `RandomBalancer` instead, applied against a weighted
/// cumulative distribution rather than a uniform pick.
pub struct LoadBalanceStrategy {
    targets: Vec<Target>,
    lookup: ProviderLookupFn,
}

impl LoadBalanceStrategy {
    pub fn new(targets: Vec<Target>, lookup: ProviderLookupFn) -> Self {
        Self { targets, lookup }
    }

    fn eligible(&self, model: &str) -> Vec<&Target> {
        self.targets
            .iter()
            .filter(|t| {
                (self.lookup)(&t.virtual_key)
                    .map(|p| p.supports_model(model))
                    .unwrap_or(false)
            })
            .collect()
    }

    fn pick<'a>(&self, eligible: &[&'a Target]) -> Option<&'a Target> {
        let total: f64 = eligible.iter().map(|t| t.weight.max(0.0).max(f64::MIN_POSITIVE)).sum();
        if total <= 0.0 {
            return None;
        }
        let mut roll = rand::thread_rng().gen_range(0.0..total);
        for target in eligible {
            let weight = target.weight.max(0.0).max(f64::MIN_POSITIVE);
            if roll < weight {
                return Some(target);
            }
            roll -= weight;
        }
        eligible.last().copied()
    }
}

#[async_trait]
impl Strategy for LoadBalanceStrategy {
    async fn execute(&self, request: &ChatRequest) -> Result<ChatResponse, GatewayError> {
        let eligible = self.eligible(&request.model);
        let chosen = self
            .pick(&eligible)
            .ok_or_else(|| GatewayError::UnknownModel(request.model.clone()))?;
        let provider = resolve_provider(&self.lookup, chosen, &request.model)?;
        provider.complete(request).await
    }

    fn candidates(&self, request: &ChatRequest) -> Vec<Target> {
        let eligible = self.eligible(&request.model);
        if eligible.is_empty() {
            return Vec::new();
        }
        let mut ordered = Vec::with_capacity(eligible.len());
        if let Some(first) = self.pick(&eligible) {
            ordered.push(first.clone());
            for target in &eligible {
                if target.virtual_key != first.virtual_key {
                    ordered.push((*target).clone());
                }
            }
        }
        ordered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;

    use crate::provider::mock::MockProvider;
    use crate::provider::Provider;

    fn lookup_for(providers: Vec<(&str, Arc<dyn Provider>)>) -> ProviderLookupFn {
        let map: HashMap<String, Arc<dyn Provider>> =
            providers.into_iter().map(|(k, v)| (k.to_string(), v)).collect();
        Arc::new(move |key: &str| map.get(key).cloned())
    }

    #[test]
    fn weighted_selection_converges_to_configured_ratio() {
        let heavy = Arc::new(MockProvider::always_success("heavy", &["gpt-x"])) as Arc<dyn Provider>;
        let light = Arc::new(MockProvider::always_success("light", &["gpt-x"])) as Arc<dyn Provider>;
        let lookup = lookup_for(vec![("heavy", heavy), ("light", light)]);

        let strategy = LoadBalanceStrategy::new(
            vec![
                Target { virtual_key: "heavy".into(), weight: 9.0, retry: None, circuit_breaker: None },
                Target { virtual_key: "light".into(), weight: 1.0, retry: None, circuit_breaker: None },
            ],
            lookup,
        );

        let eligible = strategy.eligible("gpt-x");
        let mut heavy_hits = 0;
        let trials = 5000;
        for _ in 0..trials {
            if strategy.pick(&eligible).unwrap().virtual_key == "heavy" {
                heavy_hits += 1;
            }
        }
        let ratio = heavy_hits as f64 / trials as f64;
        assert!((ratio - 0.9).abs() < 0.05, "ratio was {ratio}");
    }
}
