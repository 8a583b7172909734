use std::collections::HashMap;
use std::sync::Arc;

use super::{ModelInfo, Provider};

/// Read-only view over registered providers, implemented by `Gateway`
/// itself (spec §4.5) rather than as a separate owned collection — the
/// Gateway already owns the provider map under its `RwLock`.
pub trait Registry: Send + Sync {
    fn provider(&self, name: &str) -> Option<Arc<dyn Provider>>;
    fn provider_for_model(&self, model: &str) -> Option<Arc<dyn Provider>>;
    fn providers(&self) -> Vec<Arc<dyn Provider>>;
    fn aggregated_models(&self) -> Vec<ModelInfo>;
}

/// A standalone registry, used by tests and by any component that wants a
/// `Registry` without a full `Gateway` (e.g. the streaming dispatcher's
/// unit tests).
#[derive(Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn Provider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, provider: Arc<dyn Provider>) {
        self.providers.insert(provider.name().to_string(), provider);
    }
}

impl Registry for ProviderRegistry {
    fn provider(&self, name: &str) -> Option<Arc<dyn Provider>> {
        self.providers.get(name).cloned()
    }

    fn provider_for_model(&self, model: &str) -> Option<Arc<dyn Provider>> {
        self.providers.values().find(|p| p.supports_model(model)).cloned()
    }

    fn providers(&self) -> Vec<Arc<dyn Provider>> {
        self.providers.values().cloned().collect()
    }

    fn aggregated_models(&self) -> Vec<ModelInfo> {
        self.providers.values().flat_map(|p| p.model_info().to_vec()).collect()
    }
}
