//! Maps a `PluginSpec`'s name to a concrete `Plugin` instance.
//!
//! The teacher's equivalent of "plugins register themselves by name" is a
//! compile-time `inventory`/ctor pattern seen elsewhere in the reference
//! pack; since the built-in plugin set here is small and fixed, a single
//! match over known names achieves the same effect without pulling in an
//! extra registration-macro crate.

use std::sync::Arc;

use crate::error::GatewayError;

use super::cache::ResponseCachePlugin;
use super::guardrail::{MaxTokenPlugin, WordFilterPlugin};
use super::Plugin;

/// Instantiates the named built-in plugin from its config blob.
pub fn build_plugin(name: &str, config: &serde_json::Value) -> Result<Arc<dyn Plugin>, GatewayError> {
    match name {
        "word_filter" => Ok(Arc::new(WordFilterPlugin::from_config(config)?)),
        "max_token" => Ok(Arc::new(MaxTokenPlugin::from_config(config)?)),
        "response_cache" => Ok(Arc::new(ResponseCachePlugin::from_config(config)?)),
        other => Err(GatewayError::Config(format!("unknown plugin '{other}'"))),
    }
}
