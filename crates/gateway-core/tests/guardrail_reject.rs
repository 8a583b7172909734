//! S3 — a word-filter guardrail plugin rejects the request before any
//! provider is consulted.

use std::sync::Arc;

use gateway_core::config::{Config, PluginSpec, Stage, StrategyConfig, StrategyMode, Target};
use gateway_core::models::{ChatRequest, Message};
use gateway_core::provider::mock::MockProvider;
use gateway_core::Gateway;

fn guarded_config() -> Config {
    Config {
        strategy: StrategyConfig { mode: StrategyMode::Single, conditions: vec![] },
        targets: vec![Target { virtual_key: "mock".into(), weight: 1.0, retry: None, circuit_breaker: None }],
        plugins: vec![PluginSpec {
            name: "word_filter".into(),
            stage: Stage::Before,
            config: serde_json::json!({ "blocked_words": ["password"] }),
        }],
        aliases: Default::default(),
    }
}

#[tokio::test]
async fn guardrail_rejects_before_the_provider_is_called() {
    let gateway = Gateway::new(guarded_config()).unwrap();
    let provider = Arc::new(MockProvider::always_success("mock", &["m1"]));
    gateway.register_provider(provider.clone()).await;
    gateway.load_plugins().await.unwrap();

    let request = ChatRequest {
        model: "m1".into(),
        messages: vec![Message { role: "user".into(), content: "What is a secure password?".into(), name: None }],
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
        stream: false,
    };

    let err = gateway.route(request).await.unwrap_err();
    assert!(err.to_string().contains("blocked word detected: password"));
    assert_eq!(provider.call_count(), 0);
}
