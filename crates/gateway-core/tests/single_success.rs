//! S1 — single strategy, single healthy target: the response comes back
//! normalized (non-empty `object`/`created`) regardless of what the
//! provider itself filled in.

use std::sync::Arc;

use gateway_core::config::{Config, StrategyConfig, StrategyMode, Target};
use gateway_core::provider::mock::MockProvider;
use gateway_core::Gateway;

fn single_target_config() -> Config {
    Config {
        strategy: StrategyConfig { mode: StrategyMode::Single, conditions: vec![] },
        targets: vec![Target { virtual_key: "mock".into(), weight: 1.0, retry: None, circuit_breaker: None }],
        plugins: vec![],
        aliases: Default::default(),
    }
}

fn chat_request(model: &str) -> gateway_core::models::ChatRequest {
    gateway_core::models::ChatRequest {
        model: model.into(),
        messages: vec![gateway_core::models::Message { role: "user".into(), content: "hi".into(), name: None }],
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
    }
}

#[tokio::test]
async fn single_healthy_target_serves_the_request() {
    let gateway = Gateway::new(single_target_config()).unwrap();
    let provider = Arc::new(MockProvider::always_success("mock", &["m1"]));
    gateway.register_provider(provider.clone()).await;

    let before = chrono::Utc::now().timestamp();
    let response = gateway.route(chat_request("m1")).await.unwrap();

    assert!(!response.id.is_empty());
    assert_eq!(response.object, "chat.completion");
    assert!(response.created >= before);
    assert_eq!(response.provider, "mock");
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn unknown_model_is_rejected_before_any_provider_call() {
    let gateway = Gateway::new(single_target_config()).unwrap();
    let provider = Arc::new(MockProvider::always_success("mock", &["m1"]));
    gateway.register_provider(provider.clone()).await;

    let err = gateway.route(chat_request("does-not-exist")).await.unwrap_err();
    assert!(matches!(err, gateway_core::GatewayError::UnknownModel(_)));
    assert_eq!(provider.call_count(), 0);
}
