//! Startup: turn loaded configuration plus API keys into a registry.
//!
//! Any key problem here is fatal: the caller should abort rather than run
//! without a usable provider.

use tracing::{error, info};

use elite_core::config::{Config, ProviderSettings};
use elite_core::keys::KeyProvider;

use crate::error::InitError;
use crate::registry::{ProviderConfig, ProviderRegistry, ProviderSpec, PROVIDERS};

/// Build the provider registry for every provider present in `config`.
pub async fn initialize_providers(
    config: &Config,
    keys: &dyn KeyProvider,
) -> Result<ProviderRegistry, InitError> {
    let mut registry = ProviderRegistry::new();

    for spec in PROVIDERS {
        let Some(settings) = config.providers.get_by_name(spec.name) else {
            continue;
        };

        let api_key = resolve_api_key(spec, settings, keys).await?;
        registry.register(spec.name, provider_config(spec, settings, &api_key));
    }

    info!(providers = ?registry.names(), "AI services initialized");
    Ok(registry)
}

/// Inline key first, then the key file. Empty or malformed keys are fatal.
async fn resolve_api_key(
    spec: &'static ProviderSpec,
    settings: &ProviderSettings,
    keys: &dyn KeyProvider,
) -> Result<String, InitError> {
    let inline = settings.api_key.trim();
    let api_key = if !inline.is_empty() {
        inline.to_string()
    } else if let Some(path) = settings.api_key_path.as_deref().filter(|p| !p.is_empty()) {
        info!(provider = spec.name, path, "Reading API key");
        keys.get_secret(path).await
    } else {
        String::new()
    };

    if api_key.is_empty() {
        error!(provider = spec.name, "API key is empty or not found");
        return Err(InitError::MissingApiKey {
            provider: spec.display_name.to_string(),
        });
    }

    if !spec.is_valid_key(&api_key) {
        error!(provider = spec.name, "Invalid API key format");
        return Err(InitError::InvalidApiKey {
            provider: spec.display_name.to_string(),
        });
    }

    info!(provider = spec.name, "API key loaded successfully");
    Ok(api_key)
}

fn provider_config(
    spec: &'static ProviderSpec,
    settings: &ProviderSettings,
    api_key: &str,
) -> ProviderConfig {
    let mut config = ProviderConfig::new(spec, api_key);
    if !settings.api_url.is_empty() {
        config = config.with_endpoint_url(&settings.api_url);
    }
    if !settings.model.is_empty() {
        config = config.with_model(&settings.model);
    }
    config.max_retries = settings.max_retries;
    config.base_retry_delay_ms = settings.retry_delay_ms;
    config
}
