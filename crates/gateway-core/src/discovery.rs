//! Background periodic model discovery (spec §4.7). Providers implementing
//! `DiscoverableProvider` are polled on an interval; each cycle's results
//! replace that provider's entry in the shared cache so readers never see a
//! half-updated list.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::provider::{ModelInfo, Provider};

pub struct DiscoveryHandle {
    task: JoinHandle<()>,
}

impl DiscoveryHandle {
    /// Cancels the background task. Dropping the handle without calling
    /// this leaves the task running detached, which is fine for the
    /// process lifetime of a single discovery loop but `stop` gives tests
    /// and `ReloadConfig` a clean way to end one before starting another.
    pub fn stop(self) {
        self.task.abort();
    }
}

pub fn start(
    providers: Arc<RwLock<HashMap<String, Arc<dyn Provider>>>>,
    cache: Arc<RwLock<HashMap<String, Vec<ModelInfo>>>>,
    interval: Duration,
) -> DiscoveryHandle {
    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            run_once(&providers, &cache).await;
        }
    });
    DiscoveryHandle { task }
}

async fn run_once(
    providers: &Arc<RwLock<HashMap<String, Arc<dyn Provider>>>>,
    cache: &Arc<RwLock<HashMap<String, Vec<ModelInfo>>>>,
) {
    let snapshot: Vec<Arc<dyn Provider>> = providers.read().unwrap().values().cloned().collect();
    for provider in snapshot {
        let Some(discoverable) = provider.as_discoverable() else {
            continue;
        };
        match discoverable.discover_models().await {
            Ok(models) => {
                cache.write().unwrap().insert(provider.name().to_string(), models);
            }
            Err(err) => {
                log::warn!("model discovery failed for provider '{}': {err}", provider.name());
            }
        }
    }
}
