//! Plugin manager (spec §4.4): ordered before/after/on-error stages that
//! can mutate the in-flight request/response, attach metadata, or abort
//! processing by setting `reject`/`skip` on the shared context.
//!
//! This is conceptually distinct from `kairos-rs::middleware`, which is
//! Actix-level HTTP middleware (security headers, CORS, rate limiting,
//! auth) — those stay in `gateway-server` as external collaborators, per
//! spec §1. The plugin manager here operates purely on the typed
//! `ChatRequest`/`ChatResponse`, with no HTTP framework in sight.

pub mod cache;
pub mod guardrail;
mod registry;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::GatewayError;
use crate::models::{ChatRequest, ChatResponse};

pub use registry::build_plugin;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluginKind {
    Guardrail,
    Cache,
    Logging,
    Transform,
}

/// Mutable state threaded through a single request's plugin pipeline.
pub struct PluginContext {
    pub request: ChatRequest,
    pub response: Option<ChatResponse>,
    pub metadata: HashMap<String, Value>,
    pub skip: bool,
    pub reject: bool,
    pub reason: Option<String>,
}

impl PluginContext {
    pub fn new(request: ChatRequest) -> Self {
        Self {
            request,
            response: None,
            metadata: HashMap::new(),
            skip: false,
            reject: false,
            reason: None,
        }
    }

    pub fn reject(&mut self, reason: impl Into<String>) {
        self.reject = true;
        self.reason = Some(reason.into());
    }
}

#[async_trait]
pub trait Plugin: Send + Sync {
    fn name(&self) -> &str;
    fn kind(&self) -> PluginKind;

    async fn before_request(&self, _ctx: &mut PluginContext) -> Result<(), GatewayError> {
        Ok(())
    }
    async fn after_request(&self, _ctx: &mut PluginContext) -> Result<(), GatewayError> {
        Ok(())
    }
    async fn on_error(&self, _ctx: &mut PluginContext, _error: &GatewayError) -> Result<(), GatewayError> {
        Ok(())
    }
}

#[derive(Default)]
pub struct PluginManager {
    before: Vec<Arc<dyn Plugin>>,
    after: Vec<Arc<dyn Plugin>>,
    on_error: Vec<Arc<dyn Plugin>>,
}

impl PluginManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_before(&mut self, plugin: Arc<dyn Plugin>) {
        self.before.push(plugin);
    }
    pub fn register_after(&mut self, plugin: Arc<dyn Plugin>) {
        self.after.push(plugin);
    }
    pub fn register_on_error(&mut self, plugin: Arc<dyn Plugin>) {
        self.on_error.push(plugin);
    }

    /// Runs before-stage plugins in registration order. A plugin that sets
    /// `reject` aborts the pipeline immediately with `PluginRejected`; one
    /// that sets `skip` stops the *remaining* before-stage plugins but lets
    /// the request proceed to the strategy engine unchanged.
    pub async fn run_before(&self, ctx: &mut PluginContext) -> Result<(), GatewayError> {
        for plugin in &self.before {
            plugin.before_request(ctx).await?;
            if ctx.reject {
                let reason = ctx.reason.clone().unwrap_or_else(|| plugin.name().to_string());
                return Err(GatewayError::PluginRejected(reason));
            }
            if ctx.skip {
                break;
            }
        }
        Ok(())
    }

    /// Runs after-stage plugins; a plugin error here is logged and does not
    /// fail the already-successful response, matching the teacher's
    /// best-effort post-processing posture for non-critical middleware.
    pub async fn run_after(&self, ctx: &mut PluginContext) {
        for plugin in &self.after {
            if let Err(err) = plugin.after_request(ctx).await {
                log::warn!("after-request plugin '{}' failed: {err}", plugin.name());
            }
        }
    }

    pub async fn run_on_error(&self, ctx: &mut PluginContext, error: &GatewayError) {
        for plugin in &self.on_error {
            if let Err(err) = plugin.on_error(ctx, error).await {
                log::warn!("on-error plugin '{}' failed: {err}", plugin.name());
            }
        }
    }
}
