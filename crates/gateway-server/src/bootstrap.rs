//! Registers one `HttpProvider` per known vendor whose API key environment
//! variable is set (spec §12: "a provider is registered only if its key
//! variable is set"). The provider's `name` is the `virtual_key` a
//! `gateway.json` target must reference to route to it.

use gateway_core::provider::http_provider::{HttpProvider, HttpProviderConfig};
use gateway_core::provider::ModelInfo;
use std::sync::Arc;

struct VendorSpec {
    env_var: &'static str,
    name: &'static str,
    base_url: &'static str,
    models: &'static [&'static str],
}

const VENDORS: &[VendorSpec] = &[
    VendorSpec {
        env_var: "OPENAI_API_KEY",
        name: "openai",
        base_url: "https://api.openai.com/v1",
        models: &["gpt-4o", "gpt-4o-mini", "gpt-4-turbo", "text-embedding-3-large", "dall-e-3"],
    },
    VendorSpec {
        env_var: "ANTHROPIC_API_KEY",
        name: "anthropic",
        base_url: "https://api.anthropic.com/v1",
        models: &["claude-3-5-sonnet-latest", "claude-3-5-haiku-latest", "claude-3-opus-latest"],
    },
    VendorSpec {
        env_var: "AZURE_OPENAI_API_KEY",
        name: "azure_openai",
        base_url: "https://api.azure-openai.example/v1",
        models: &["gpt-4o"],
    },
    VendorSpec {
        env_var: "MISTRAL_API_KEY",
        name: "mistral",
        base_url: "https://api.mistral.ai/v1",
        models: &["mistral-large-latest", "mistral-small-latest"],
    },
    VendorSpec {
        env_var: "GROQ_API_KEY",
        name: "groq",
        base_url: "https://api.groq.com/openai/v1",
        models: &["llama-3.3-70b-versatile", "mixtral-8x7b-32768"],
    },
    VendorSpec {
        env_var: "COHERE_API_KEY",
        name: "cohere",
        base_url: "https://api.cohere.ai/v1",
        models: &["command-r-plus"],
    },
];

/// Registers every vendor whose API key is present in the environment.
/// Returns the number registered, purely for the startup log line — config
/// validation can't check targets against providers (providers register
/// after the config is loaded), so an empty registration set is logged
/// loudly rather than failing the process outright; `/healthz` still comes
/// up while an operator fixes their environment, and `/readyz` reports
/// not-ready until at least one provider is registered.
pub async fn register_configured_providers(gateway: &gateway_core::Gateway) -> usize {
    let mut registered = 0;
    for vendor in VENDORS {
        let Ok(api_key) = std::env::var(vendor.env_var) else {
            continue;
        };
        let config = HttpProviderConfig {
            name: vendor.name.to_string(),
            base_url: vendor.base_url.to_string(),
            api_key: Some(api_key),
            models: vendor.models.iter().map(|m| m.to_string()).collect(),
            model_info: vendor
                .models
                .iter()
                .map(|m| ModelInfo { id: m.to_string(), owned_by: vendor.name.to_string(), context_window: None })
                .collect(),
        };
        gateway.register_provider(Arc::new(HttpProvider::new(config))).await;
        log::info!("registered provider '{}' ({} models)", vendor.name, vendor.models.len());
        registered += 1;
    }
    registered
}
