//! Gateway configuration: schema, loading, and validation.

pub mod settings;
pub mod validation;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub use settings::load_config;
pub use validation::{ConfigValidator, ValidationReport};

/// Top-level configuration document (spec §3 `Config`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub strategy: StrategyConfig,
    pub targets: Vec<Target>,
    #[serde(default)]
    pub plugins: Vec<PluginSpec>,
    #[serde(default)]
    pub aliases: HashMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyMode {
    Single,
    Fallback,
    LoadBalance,
    Conditional,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyConfig {
    pub mode: StrategyMode,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionKey {
    Model,
    ModelPrefix,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Condition {
    pub key: ConditionKey,
    pub value: String,
    pub target: String,
}

impl Condition {
    pub fn matches(&self, model: &str) -> bool {
        match self.key {
            ConditionKey::Model => model == self.value,
            ConditionKey::ModelPrefix => model.starts_with(&self.value),
        }
    }
}

fn default_weight() -> f64 {
    1.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitBreakerSpec {
    #[serde(default)]
    pub failure_threshold: Option<u32>,
    #[serde(default)]
    pub success_threshold: Option<u32>,
    #[serde(default)]
    pub open_timeout_secs: Option<u64>,
}

/// A routable virtual key, the unit the strategy engine selects among.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub virtual_key: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default)]
    pub retry: Option<u32>,
    #[serde(default)]
    pub circuit_breaker: Option<CircuitBreakerSpec>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Before,
    After,
    OnError,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginSpec {
    pub name: String,
    pub stage: Stage,
    #[serde(default)]
    pub config: serde_json::Value,
}
