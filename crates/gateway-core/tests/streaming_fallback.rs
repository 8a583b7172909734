//! S6 — a conditional strategy's first match is a non-streaming provider;
//! the dispatcher walks past it to a streaming-capable sibling instead of
//! failing the request.

use std::sync::Arc;

use futures_util::StreamExt;
use gateway_core::config::{Condition, ConditionKey, Config, StrategyConfig, StrategyMode, Target};
use gateway_core::models::{ChatRequest, Message};
use gateway_core::provider::mock::MockProvider;
use gateway_core::Gateway;

fn conditional_config() -> Config {
    Config {
        strategy: StrategyConfig {
            mode: StrategyMode::Conditional,
            conditions: vec![Condition { key: ConditionKey::Model, value: "m1".into(), target: "text-only".into() }],
        },
        targets: vec![
            Target { virtual_key: "text-only".into(), weight: 1.0, retry: None, circuit_breaker: None },
            Target { virtual_key: "streaming".into(), weight: 1.0, retry: None, circuit_breaker: None },
        ],
        plugins: vec![],
        aliases: Default::default(),
    }
}

fn chat_request() -> ChatRequest {
    ChatRequest {
        model: "m1".into(),
        messages: vec![Message { role: "user".into(), content: "hi".into(), name: None }],
        max_tokens: None,
        temperature: None,
        top_p: None,
        n: None,
        stop: None,
        presence_penalty: None,
        frequency_penalty: None,
        seed: None,
        user: None,
        logit_bias: None,
        stream: true,
    }
}

#[tokio::test]
async fn dispatcher_skips_the_non_streaming_match_for_its_streaming_sibling() {
    let gateway = Gateway::new(conditional_config()).unwrap();
    let text_only = Arc::new(MockProvider::non_streaming("text-only", &["m1"]));
    let streaming = Arc::new(MockProvider::always_success("streaming", &["m1"]));
    gateway.register_provider(text_only.clone()).await;
    gateway.register_provider(streaming.clone()).await;

    let mut chunk_stream = gateway.route_stream(chat_request()).await.unwrap();

    let mut chunks = Vec::new();
    while let Some(chunk) = chunk_stream.next().await {
        chunks.push(chunk.unwrap());
    }

    assert!(!chunks.is_empty());
    assert!(chunks.iter().all(|c| c.provider == "streaming"));
    assert!(chunks.last().unwrap().choices[0].finish_reason.as_deref() == Some("stop"));
    assert_eq!(text_only.call_count(), 0);
    assert_eq!(streaming.call_count(), 1);
}
