//! S5 — over many requests, a load-balance strategy's empirical selection
//! frequency tracks each target's configured weight.

use std::sync::Arc;

use gateway_core::config::{Config, StrategyConfig, StrategyMode, Target};
use gateway_core::models::{ChatRequest, Message};
use gateway_core::provider::mock::MockProvider;
use gateway_core::Gateway;

fn weighted_config() -> Config {
    Config {
        strategy: StrategyConfig { mode: StrategyMode::LoadBalance, conditions: vec![] },
        targets: vec![
            Target { virtual_key: "a".into(), weight: 0.9, retry: None, circuit_breaker: None },
            Target { virtual_key: "b".into(), weight: 0.1, retry: None, circuit_breaker: None },
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
async fn ninety_ten_split_converges_over_a_thousand_requests() {
    let gateway = Gateway::new(weighted_config()).unwrap();
    let a = Arc::new(MockProvider::always_success("a", &["m1"]));
    let b = Arc::new(MockProvider::always_success("b", &["m1"]));
    gateway.register_provider(a.clone()).await;
    gateway.register_provider(b.clone()).await;

    for _ in 0..1000 {
        gateway.route(chat_request()).await.unwrap();
    }

    assert!(a.call_count() >= 700, "a got {} calls", a.call_count());
    assert!(b.call_count() >= 1, "b got {} calls", b.call_count());
    assert_eq!(a.call_count() + b.call_count(), 1000);
}
