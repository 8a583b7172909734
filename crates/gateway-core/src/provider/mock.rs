//! An in-memory provider stand-in used by `gateway-core`'s own test suite
//! and exposed behind the `test-util` feature so integration tests in
//! `tests/*.rs` can use it too, the same role `kairos-rs`'s `tests/`
//! directory fills with a local Actix test server.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::GatewayError;
use crate::models::{ChatRequest, ChatResponse, Choice, ChunkStream, DeltaChoice, Message, MessageDelta, StreamChunk, Usage};

use super::{ModelInfo, Provider, StreamingProvider};

enum Outcome {
    Success,
    Failure(String),
}

pub struct MockProvider {
    name: String,
    models: Vec<String>,
    model_info: Vec<ModelInfo>,
    queue: Mutex<VecDeque<Outcome>>,
    default_outcome_is_success: bool,
    default_message: Mutex<String>,
    call_count: AtomicU32,
    streaming: bool,
}

impl MockProvider {
    pub fn always_success(name: &str, models: &[&str]) -> Self {
        Self::new(name, models, true, true)
    }

    pub fn always_failure(name: &str, models: &[&str], message: impl Into<String>) -> Self {
        let provider = Self::new(name, models, false, true);
        *provider.default_message.lock().unwrap() = message.into();
        provider
    }

    /// A healthy provider with no streaming capability, for exercising the
    /// dispatcher's fall-through to a streaming-capable sibling.
    pub fn non_streaming(name: &str, models: &[&str]) -> Self {
        Self::new(name, models, true, false)
    }

    fn new(name: &str, models: &[&str], default_success: bool, streaming: bool) -> Self {
        Self {
            name: name.to_string(),
            models: models.iter().map(|m| m.to_string()).collect(),
            model_info: models
                .iter()
                .map(|m| ModelInfo { id: m.to_string(), owned_by: "mock".to_string(), context_window: None })
                .collect(),
            queue: Mutex::new(VecDeque::new()),
            default_outcome_is_success: default_success,
            default_message: Mutex::new("mock failure".to_string()),
            call_count: AtomicU32::new(0),
            streaming,
        }
    }

    /// Queues one scripted failure; once drained, the provider reverts to
    /// its default outcome.
    pub fn queue_failure(&self, message: impl Into<String>) {
        self.queue.lock().unwrap().push_back(Outcome::Failure(message.into()));
    }

    pub fn queue_success(&self) {
        self.queue.lock().unwrap().push_back(Outcome::Success);
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::SeqCst)
    }

    fn next_outcome(&self) -> Outcome {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        let mut queue = self.queue.lock().unwrap();
        queue.pop_front().unwrap_or(if self.default_outcome_is_success {
            Outcome::Success
        } else {
            Outcome::Failure(self.default_message.lock().unwrap().clone())
        })
    }

    fn response(&self, request: &ChatRequest) -> ChatResponse {
        ChatResponse {
            id: format!("mock-{}", self.call_count()),
            object: "chat.completion".into(),
            created: 0,
            provider: self.name.clone(),
            model: request.model.clone(),
            choices: vec![Choice {
                index: 0,
                message: Message { role: "assistant".into(), content: "mock response".into(), name: None },
                finish_reason: Some("stop".into()),
            }],
            usage: Usage { prompt_tokens: 10, completion_tokens: 5, ..Default::default() },
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn supported_models(&self) -> &[String] {
        &self.models
    }

    fn model_info(&self) -> &[ModelInfo] {
        &self.model_info
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, GatewayError> {
        match self.next_outcome() {
            Outcome::Success => Ok(self.response(request)),
            Outcome::Failure(message) => Err(GatewayError::Provider { provider: self.name.clone(), message }),
        }
    }

    fn as_streaming(&self) -> Option<&dyn StreamingProvider> {
        if self.streaming {
            Some(self)
        } else {
            None
        }
    }
}

#[async_trait]
impl StreamingProvider for MockProvider {
    async fn complete_stream(&self, request: &ChatRequest) -> Result<ChunkStream, GatewayError> {
        match self.next_outcome() {
            Outcome::Failure(message) => {
                return Err(GatewayError::Provider { provider: self.name.clone(), message })
            }
            Outcome::Success => {}
        }
        let model = request.model.clone();
        let provider = self.name.clone();
        let chunks = vec![
            StreamChunk {
                id: "mock-chunk-0".into(),
                object: "chat.completion.chunk".into(),
                created: 0,
                provider: provider.clone(),
                model: model.clone(),
                choices: vec![DeltaChoice {
                    index: 0,
                    delta: MessageDelta { role: Some("assistant".into()), content: Some("mock".into()) },
                    finish_reason: None,
                }],
                error: None,
            },
            StreamChunk {
                id: "mock-chunk-1".into(),
                object: "chat.completion.chunk".into(),
                created: 0,
                provider,
                model,
                choices: vec![DeltaChoice {
                    index: 0,
                    delta: MessageDelta { role: None, content: None },
                    finish_reason: Some("stop".into()),
                }],
                error: None,
            },
        ];
        Ok(Box::pin(futures::stream::iter(chunks.into_iter().map(Ok::<_, GatewayError>))))
    }
}
