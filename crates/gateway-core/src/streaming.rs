//! Streaming dispatcher (spec §4.6): derives the same ordered candidate
//! list the unary strategy would consult, but opens a stream against the
//! first eligible candidate instead of running the retry loop — a
//! mid-stream failure becomes a single `error` chunk, not a fallback to
//! the next candidate. If no configured candidate fits, falls back to
//! scanning the entire provider table (spec §4.6), so a streaming-capable
//! provider that is registered but not named in any target is still found.

use std::collections::HashSet;
use std::sync::Arc;

use crate::config::Target;
use crate::error::GatewayError;
use crate::models::{ChatRequest, ChunkStream, StreamChunk};
use crate::provider::Provider;
use crate::strategy::ProviderLookupFn;

/// Finds the first candidate that is registered, supports the requested
/// model, and implements streaming; opens the stream through it. Falls
/// back to `all_providers` (every registered provider, not just those
/// named by `candidates`) before giving up.
pub async fn dispatch(
    candidates: &[Target],
    lookup: &ProviderLookupFn,
    request: &ChatRequest,
    all_providers: &[Arc<dyn Provider>],
) -> Result<ChunkStream, GatewayError> {
    let mut tried = HashSet::new();
    for candidate in candidates {
        tried.insert(candidate.virtual_key.as_str());
        let Some(provider) = lookup(&candidate.virtual_key) else {
            continue;
        };
        if !provider.supports_model(&request.model) {
            continue;
        }
        if let Some(streaming) = provider.as_streaming() {
            return streaming.complete_stream(request).await;
        }
    }

    for provider in all_providers {
        if tried.contains(provider.name()) {
            continue;
        }
        if !provider.supports_model(&request.model) {
            continue;
        }
        if let Some(streaming) = provider.as_streaming() {
            return streaming.complete_stream(request).await;
        }
    }

    Err(GatewayError::NoStreamingProvider(request.model.clone()))
}

/// Wraps a single error as the one mid-stream SSE event spec §4.6 allows,
/// used by `gateway-server` when an already-open stream fails partway
/// through.
pub fn error_chunk(model: &str, message: impl Into<String>) -> StreamChunk {
    StreamChunk {
        id: String::new(),
        object: "chat.completion.chunk".to_string(),
        created: 0,
        provider: String::new(),
        model: model.to_string(),
        choices: Vec::new(),
        error: Some(message.into()),
    }
}
