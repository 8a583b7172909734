//! S2 — fallback strategy with a failing first target and a healthy
//! second: the chain moves on silently and each target is called exactly
//! once.

use std::sync::Arc;

use gateway_core::config::{Config, StrategyConfig, StrategyMode, Target};
use gateway_core::models::{ChatRequest, Message};
use gateway_core::provider::mock::MockProvider;
use gateway_core::Gateway;

fn fallback_config() -> Config {
    Config {
        strategy: StrategyConfig { mode: StrategyMode::Fallback, conditions: vec![] },
        targets: vec![
            Target { virtual_key: "bad".into(), weight: 1.0, retry: Some(1), circuit_breaker: None },
            Target { virtual_key: "good".into(), weight: 1.0, retry: None, circuit_breaker: None },
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
        stream: false,
    }
}

#[tokio::test]
async fn bad_target_fails_over_to_good_target() {
    let gateway = Gateway::new(fallback_config()).unwrap();
    let bad = Arc::new(MockProvider::always_failure("bad", &["m1"], "upstream exploded"));
    let good = Arc::new(MockProvider::always_success("good", &["m1"]));
    gateway.register_provider(bad.clone()).await;
    gateway.register_provider(good.clone()).await;

    let response = gateway.route(chat_request()).await.unwrap();

    assert_eq!(response.provider, "good");
    assert_eq!(bad.call_count(), 1);
    assert_eq!(good.call_count(), 1);
}

#[tokio::test]
async fn all_targets_failing_surfaces_an_aggregated_error() {
    let gateway = Gateway::new(fallback_config()).unwrap();
    let bad = Arc::new(MockProvider::always_failure("bad", &["m1"], "bad down"));
    let also_bad = Arc::new(MockProvider::always_failure("good", &["m1"], "good down too"));
    gateway.register_provider(bad.clone()).await;
    gateway.register_provider(also_bad.clone()).await;

    let err = gateway.route(chat_request()).await.unwrap_err();
    assert!(matches!(err, gateway_core::GatewayError::AllFailed(_)));
    assert_eq!(bad.call_count(), 1);
    assert_eq!(also_bad.call_count(), 1);
}
