use std::time::Duration;

use async_trait::async_trait;

use crate::config::Target;
use crate::error::GatewayError;
use crate::models::{ChatRequest, ChatResponse};

use super::{resolve_provider, ProviderLookupFn, Strategy};

/// Tries each target in declared order, retrying a given target up to N
/// times with exponential backoff before moving on to the next.
///
/// N is read once, from the *first* target's `retry` field, and applied
/// uniformly to every target's attempt loop — an open question in spec §4.2
/// resolved this way deliberately (see DESIGN.md). Backoff sleeps only
/// happen between retries of the *same* target; switching to the next
/// target after exhausting retries is immediate.
pub struct FallbackStrategy {
    targets: Vec<Target>,
    retries_per_target: u32,
    lookup: ProviderLookupFn,
}

impl FallbackStrategy {
    pub fn new(targets: Vec<Target>, lookup: ProviderLookupFn) -> Self {
        let retries_per_target = targets.first().and_then(|t| t.retry).unwrap_or(1).max(1);
        Self {
            targets,
            retries_per_target,
            lookup,
        }
    }
}

#[async_trait]
impl Strategy for FallbackStrategy {
    async fn execute(&self, request: &ChatRequest) -> Result<ChatResponse, GatewayError> {
        let mut last_error: Option<GatewayError> = None;

        for target in &self.targets {
            let provider = match resolve_provider(&self.lookup, target, &request.model) {
                Ok(provider) => provider,
                Err(err) => {
                    last_error = Some(err);
                    continue;
                }
            };

            for attempt in 0..self.retries_per_target {
                match provider.complete(request).await {
                    Ok(response) => return Ok(response),
                    Err(err) => {
                        last_error = Some(err);
                        if attempt + 1 < self.retries_per_target {
                            let backoff = Duration::from_millis(100 * 2u64.pow(attempt));
                            tokio::time::sleep(backoff).await;
                        }
                    }
                }
            }
        }

        Err(GatewayError::AllFailed(
            last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no targets configured".to_string()),
        ))
    }

    fn candidates(&self, _request: &ChatRequest) -> Vec<Target> {
        self.targets.clone()
    }
}
