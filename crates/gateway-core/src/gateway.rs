//! The Gateway orchestrator (spec §4.1): owns the provider registry, the
//! cached strategy, per-target circuit breakers, the discovered-model
//! cache, the plugin manager, and hooks.
//!
//! Locking follows spec §5: `config`, `strategy`, `plugins`, and `hooks`
//! are `tokio::sync::RwLock`s, since reading them may need to stay held
//! while the strategy executes an `.await`. `providers`, `breakers`, and
//! `discovered_models` only ever need brief, non-awaiting critical
//! sections (a map lookup or insert), so they use `std::sync::RwLock` —
//! the same choice `circuit_breaker::CircuitBreaker` makes for its
//! `open_until` field. No component holds the Gateway's own lock across a
//! provider call: `build_lookup` snapshots the maps into owned `Arc`
//! clones before handing the closure to a strategy.

use std::collections::HashMap;
use std::sync::{Arc, RwLock as SyncRwLock};
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::alias;
use crate::circuit_breaker::CircuitBreaker;
use crate::config::Config;
use crate::discovery::{self, DiscoveryHandle};
use crate::error::GatewayError;
use crate::hooks::{HookFn, HookPayload, HookRegistry};
use crate::metrics::{MetricsSink, NoopMetrics};
use crate::models::{ChatRequest, ChatResponse, ChunkStream, EmbeddingRequest, EmbeddingResponse, ImageRequest, ImageResponse};
use crate::plugin::{Plugin, PluginContext, PluginManager};
use crate::provider::{BreakerWrappedProvider, ModelInfo, Provider, Registry};
use crate::streaming;
use crate::strategy::{self, ProviderLookupFn, Strategy};

/// Hook subjects (spec §6): `gateway.` prefix distinguishes these from a
/// future hook source within the same process.
const HOOK_SUBJECT_COMPLETED: &str = "gateway.request.completed";
const HOOK_SUBJECT_FAILED: &str = "gateway.request.failed";

pub struct Gateway {
    config: RwLock<Config>,
    providers: Arc<SyncRwLock<HashMap<String, Arc<dyn Provider>>>>,
    strategy: RwLock<Option<Arc<dyn Strategy>>>,
    breakers: SyncRwLock<HashMap<String, Arc<CircuitBreaker>>>,
    discovered_models: Arc<SyncRwLock<HashMap<String, Vec<ModelInfo>>>>,
    plugins: RwLock<PluginManager>,
    hooks: RwLock<HookRegistry>,
    metrics: Arc<dyn MetricsSink>,
    discovery_handle: std::sync::Mutex<Option<DiscoveryHandle>>,
}

impl Gateway {
    pub fn new(config: Config) -> Result<Self, GatewayError> {
        crate::config::ConfigValidator::validate_comprehensive(&config)?;
        Ok(Self {
            config: RwLock::new(config),
            providers: Arc::new(SyncRwLock::new(HashMap::new())),
            strategy: RwLock::new(None),
            breakers: SyncRwLock::new(HashMap::new()),
            discovered_models: Arc::new(SyncRwLock::new(HashMap::new())),
            plugins: RwLock::new(PluginManager::new()),
            hooks: RwLock::new(HookRegistry::new()),
            metrics: Arc::new(NoopMetrics),
            discovery_handle: std::sync::Mutex::new(None),
        })
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsSink>) -> Self {
        self.metrics = metrics;
        self
    }

    pub async fn register_provider(&self, provider: Arc<dyn Provider>) {
        self.providers.write().unwrap().insert(provider.name().to_string(), provider);
        // The provider set changed, so any cached strategy's captured
        // lookup closure is stale; force a rebuild on the next route.
        *self.strategy.write().await = None;
    }

    pub async fn register_plugin(&self, stage: crate::config::Stage, plugin: Arc<dyn Plugin>) {
        let mut plugins = self.plugins.write().await;
        match stage {
            crate::config::Stage::Before => plugins.register_before(plugin),
            crate::config::Stage::After => plugins.register_after(plugin),
            crate::config::Stage::OnError => plugins.register_on_error(plugin),
        }
    }

    /// Builds and registers every plugin named in the current config's
    /// `plugins` list, using the built-in factory registry.
    pub async fn load_plugins(&self) -> Result<(), GatewayError> {
        let specs = self.config.read().await.plugins.clone();
        for spec in specs {
            let plugin = crate::plugin::build_plugin(&spec.name, &spec.config)?;
            self.register_plugin(spec.stage, plugin).await;
        }
        Ok(())
    }

    pub async fn add_hook(&self, hook: HookFn) {
        self.hooks.write().await.add(hook);
    }

    /// Starts (or restarts) the periodic discovery loop. Any previously
    /// running loop is cancelled first.
    pub fn start_discovery(&self, interval: Duration) {
        let mut handle_slot = self.discovery_handle.lock().unwrap();
        if let Some(existing) = handle_slot.take() {
            existing.stop();
        }
        *handle_slot = Some(discovery::start(
            self.providers.clone(),
            self.discovered_models.clone(),
            interval,
        ));
    }

    pub async fn reload_config(&self, config: Config) -> Result<(), GatewayError> {
        crate::config::ConfigValidator::validate_comprehensive(&config)?;
        *self.config.write().await = config;
        *self.strategy.write().await = None;
        self.breakers.write().unwrap().clear();
        Ok(())
    }

    async fn ensure_strategy(&self) -> Result<Arc<dyn Strategy>, GatewayError> {
        if let Some(existing) = self.strategy.read().await.as_ref() {
            return Ok(existing.clone());
        }

        let config = self.config.read().await.clone();
        {
            let mut breakers = self.breakers.write().unwrap();
            for target in &config.targets {
                if let Some(spec) = &target.circuit_breaker {
                    breakers.entry(target.virtual_key.clone()).or_insert_with(|| {
                        Arc::new(CircuitBreaker::new(target.virtual_key.clone(), spec.clone().into()))
                    });
                }
            }
        }

        let lookup = self.build_lookup();
        let built = strategy::build(&config, lookup)?;

        let mut slot = self.strategy.write().await;
        if let Some(existing) = slot.as_ref() {
            return Ok(existing.clone());
        }
        *slot = Some(built.clone());
        Ok(built)
    }

    /// Snapshots the current provider and breaker maps into a closure that
    /// owns cloned `Arc`s, so the closure can be called from inside a
    /// strategy's `execute` without holding any Gateway lock.
    fn build_lookup(&self) -> ProviderLookupFn {
        let providers = self.providers.read().unwrap().clone();
        let breakers = self.breakers.read().unwrap().clone();
        Arc::new(move |key: &str| {
            let provider = providers.get(key)?.clone();
            Some(match breakers.get(key) {
                Some(breaker) => BreakerWrappedProvider::new(provider, breaker.clone()) as Arc<dyn Provider>,
                None => provider,
            })
        })
    }

    pub async fn route(&self, mut request: ChatRequest) -> Result<ChatResponse, GatewayError> {
        let trace_id = Uuid::new_v4().to_string();
        let started = Instant::now();

        request.validate()?;
        request.model = alias::resolve(&self.config.read().await.aliases, &request.model);

        let strategy = self.ensure_strategy().await?;
        let plugins = self.plugins.read().await;

        let mut ctx = PluginContext::new(request);
        if let Err(err) = plugins.run_before(&mut ctx).await {
            self.metrics.record_request("rejected");
            // spec §4.1 step 3 / §8.2: a before-plugin rejection bumps the
            // rejected counter but publishes no hook event at all — in
            // particular no `request.completed`.
            self.publish_outcome(&trace_id, None, &ctx.request.model, started, "rejected", None, None).await;
            return Err(err);
        }

        if ctx.skip {
            if let Some(mut response) = ctx.response.take() {
                response.normalize();
                plugins.run_after(&mut ctx).await;
                self.metrics.record_request("success");
                self.publish_outcome(
                    &trace_id,
                    Some(response.provider.clone()),
                    &response.model,
                    started,
                    "success",
                    Some(&response),
                    Some(HOOK_SUBJECT_COMPLETED),
                )
                .await;
                return Ok(response);
            }
        }

        match strategy.execute(&ctx.request).await {
            Ok(mut response) => {
                response.normalize();
                ctx.response = Some(response.clone());
                plugins.run_after(&mut ctx).await;
                self.metrics.record_request("success");
                self.metrics.record_tokens(&response.provider, response.usage.prompt_tokens, response.usage.completion_tokens);
                self.publish_outcome(
                    &trace_id,
                    Some(response.provider.clone()),
                    &response.model,
                    started,
                    "success",
                    Some(&response),
                    Some(HOOK_SUBJECT_COMPLETED),
                )
                .await;
                Ok(response)
            }
            Err(err) => {
                plugins.run_on_error(&mut ctx, &err).await;
                self.metrics.record_request("error");
                if let GatewayError::Provider { provider, .. } = &err {
                    self.metrics.record_provider_error(provider);
                }
                self.publish_outcome(&trace_id, None, &ctx.request.model, started, "error", None, Some(HOOK_SUBJECT_FAILED))
                    .await;
                Err(err)
            }
        }
    }

    pub async fn route_stream(&self, mut request: ChatRequest) -> Result<ChunkStream, GatewayError> {
        request.validate()?;
        request.model = alias::resolve(&self.config.read().await.aliases, &request.model);

        let strategy = self.ensure_strategy().await?;
        let plugins = self.plugins.read().await;

        let mut ctx = PluginContext::new(request);
        plugins.run_before(&mut ctx).await?;

        let candidates = strategy.candidates(&ctx.request);
        let lookup = self.build_lookup();
        let all_providers = self.providers.read().unwrap().values().cloned().collect::<Vec<_>>();
        streaming::dispatch(&candidates, &lookup, &ctx.request, &all_providers).await
    }

    pub async fn embed(&self, mut request: EmbeddingRequest) -> Result<EmbeddingResponse, GatewayError> {
        request.validate()?;
        request.model = alias::resolve(&self.config.read().await.aliases, &request.model);

        let provider = self
            .providers
            .read()
            .unwrap()
            .values()
            .find(|p| p.supports_model(&request.model) && p.as_embedding().is_some())
            .cloned()
            .ok_or_else(|| GatewayError::UnknownModel(request.model.clone()))?;

        provider
            .as_embedding()
            .expect("checked above")
            .embed(&request)
            .await
    }

    pub async fn generate_image(&self, mut request: ImageRequest) -> Result<ImageResponse, GatewayError> {
        request.validate()?;
        request.model = alias::resolve(&self.config.read().await.aliases, &request.model);

        let provider = self
            .providers
            .read()
            .unwrap()
            .values()
            .find(|p| p.supports_model(&request.model) && p.as_image().is_some())
            .cloned()
            .ok_or_else(|| GatewayError::UnknownModel(request.model.clone()))?;

        provider
            .as_image()
            .expect("checked above")
            .generate_image(&request)
            .await
    }

    /// Records duration/logs the outcome unconditionally, and publishes a
    /// hook event under `subject` when given. `subject` is `None` for a
    /// before-plugin rejection (spec §4.1 step 3 publishes no hook at all);
    /// otherwise it's `gateway.request.completed` or `gateway.request.failed`
    /// (spec §4.1 steps 5-6, §6).
    async fn publish_outcome(
        &self,
        trace_id: &str,
        provider: Option<String>,
        model: &str,
        started: Instant,
        status: &str,
        response: Option<&ChatResponse>,
        subject: Option<&str>,
    ) {
        let latency_ms = started.elapsed().as_millis() as u64;
        self.metrics.record_duration_ms(latency_ms);
        log::info!("trace={trace_id} model={model} status={status} latency_ms={latency_ms}");

        let Some(subject) = subject else {
            return;
        };
        let payload = HookPayload {
            trace_id: trace_id.to_string(),
            provider,
            model: model.to_string(),
            latency_ms,
            status: status.to_string(),
            tokens_in: response.map(|r| r.usage.prompt_tokens).unwrap_or(0),
            tokens_out: response.map(|r| r.usage.completion_tokens).unwrap_or(0),
            timestamp: chrono::Utc::now(),
        };
        self.hooks.read().await.publish(subject, payload);
    }
}

impl Registry for Gateway {
    fn provider(&self, name: &str) -> Option<Arc<dyn Provider>> {
        self.providers.read().unwrap().get(name).cloned()
    }

    fn provider_for_model(&self, model: &str) -> Option<Arc<dyn Provider>> {
        self.providers.read().unwrap().values().find(|p| p.supports_model(model)).cloned()
    }

    fn providers(&self) -> Vec<Arc<dyn Provider>> {
        self.providers.read().unwrap().values().cloned().collect()
    }

    fn aggregated_models(&self) -> Vec<ModelInfo> {
        let discovered = self.discovered_models.read().unwrap();
        let providers = self.providers.read().unwrap();
        let mut models = Vec::new();
        for provider in providers.values() {
            match discovered.get(provider.name()) {
                Some(discovered_models) => models.extend(discovered_models.iter().cloned()),
                None => models.extend(provider.model_info().iter().cloned()),
            }
        }
        models
    }
}
