//! Config loader — reads `~/.elite/config.json`, merges env vars, and
//! applies legacy migrations.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.elite/config.json`
//! 3. Environment variables `ELITE_<SECTION>__<FIELD>` (override JSON)

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::{Config, Environment, ProviderSettings};

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from the default path + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path
        .map(PathBuf::from)
        .unwrap_or_else(get_config_path);

    apply_env_overrides(load_config_from_path(&config_path))
}

/// Load config from a specific file path, without env overrides.
fn load_config_from_path(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return Config::default();
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return Config::default();
        }
    };

    // Parse JSON → Value first for migration
    let mut raw: serde_json::Value = match serde_json::from_str(&content) {
        Ok(v) => v,
        Err(e) => {
            warn!("Failed to parse config JSON: {}", e);
            return Config::default();
        }
    };

    migrate_config(&mut raw);

    match serde_json::from_value(raw) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to deserialize config: {}", e);
            Config::default()
        }
    }
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> std::io::Result<()> {
    let config_path = path
        .map(PathBuf::from)
        .unwrap_or_else(get_config_path);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    std::fs::write(&config_path, json)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Apply legacy config migrations.
///
/// Renames `providers.<name>.retryDelay` → `providers.<name>.retryDelayMs`.
fn migrate_config(raw: &mut serde_json::Value) {
    let Some(providers) = raw.get_mut("providers").and_then(|p| p.as_object_mut()) else {
        return;
    };

    for (name, provider) in providers.iter_mut() {
        let Some(obj) = provider.as_object_mut() else {
            continue;
        };
        if obj.contains_key("retryDelayMs") {
            continue;
        }
        if let Some(delay) = obj.remove("retryDelay") {
            obj.insert("retryDelayMs".to_string(), delay);
            debug!(provider = %name, "Migrated retryDelay → retryDelayMs");
        }
    }
}

/// Apply environment variable overrides on top of a loaded config.
///
/// Env var format: `ELITE_<SECTION>__<FIELD>` (double underscore as delimiter).
///
/// Supported overrides:
/// - `ELITE_ENVIRONMENT` → `environment` (`dev`/`prod`)
/// - `ELITE_PROVIDERS__<NAME>__API_KEY` → `providers.<name>.api_key`
/// - `ELITE_PROVIDERS__<NAME>__API_KEY_PATH` → `providers.<name>.api_key_path`
/// - `ELITE_PROVIDERS__<NAME>__API_URL` → `providers.<name>.api_url`
/// - `ELITE_PROVIDERS__<NAME>__MODEL` → `providers.<name>.model`
/// - `ELITE_PROVIDERS__<NAME>__MAX_RETRIES` → `providers.<name>.max_retries`
/// - `ELITE_PROVIDERS__<NAME>__RETRY_DELAY_MS` → `providers.<name>.retry_delay_ms`
/// - `ELITE_REQUEST__TEMPERATURE` → `request.temperature`
/// - `ELITE_REQUEST__MAX_TOKENS` → `request.max_tokens`
/// - `ELITE_TRANSPORT__TIMEOUT_SECS` → `transport.timeout_secs`
fn apply_env_overrides(mut config: Config) -> Config {
    if let Ok(val) = std::env::var("ELITE_ENVIRONMENT") {
        match Environment::parse(&val) {
            Some(env) => config.environment = env,
            None => warn!("Ignoring unknown ELITE_ENVIRONMENT value: {}", val),
        }
    }

    apply_provider_env(&mut config.providers.openai, "OPENAI");

    if let Ok(val) = std::env::var("ELITE_REQUEST__TEMPERATURE") {
        if let Ok(t) = val.parse::<f64>() {
            config.request.temperature = t;
        }
    }
    if let Ok(val) = std::env::var("ELITE_REQUEST__MAX_TOKENS") {
        if let Ok(n) = val.parse::<u32>() {
            config.request.max_tokens = n;
        }
    }

    if let Ok(val) = std::env::var("ELITE_TRANSPORT__TIMEOUT_SECS") {
        if let Ok(n) = val.parse::<u64>() {
            config.transport.timeout_secs = n;
        }
    }

    config
}

/// Apply env var overrides for a single provider.
fn apply_provider_env(provider: &mut ProviderSettings, name: &str) {
    if let Ok(val) = std::env::var(format!("ELITE_PROVIDERS__{name}__API_KEY")) {
        provider.api_key = val;
    }
    if let Ok(val) = std::env::var(format!("ELITE_PROVIDERS__{name}__API_KEY_PATH")) {
        provider.api_key_path = Some(val);
    }
    if let Ok(val) = std::env::var(format!("ELITE_PROVIDERS__{name}__API_URL")) {
        provider.api_url = val;
    }
    if let Ok(val) = std::env::var(format!("ELITE_PROVIDERS__{name}__MODEL")) {
        provider.model = val;
    }
    if let Ok(val) = std::env::var(format!("ELITE_PROVIDERS__{name}__MAX_RETRIES")) {
        if let Ok(n) = val.parse::<u32>() {
            provider.max_retries = Some(n);
        }
    }
    if let Ok(val) = std::env::var(format!("ELITE_PROVIDERS__{name}__RETRY_DELAY_MS")) {
        if let Ok(n) = val.parse::<u64>() {
            provider.retry_delay_ms = Some(n);
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp_json(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_missing_file() {
        let config = load_config_from_path(Path::new("/nonexistent/path/config.json"));
        assert_eq!(config.request.max_tokens, 1000);
        assert_eq!(config.providers.openai.model, "gpt-3.5-turbo");
    }

    #[test]
    fn test_load_valid_json() {
        let file = write_temp_json(r#"{
            "providers": {
                "openai": {
                    "model": "gpt-4o",
                    "maxRetries": 5
                }
            },
            "request": { "maxTokens": 256 }
        }"#);

        let config = load_config_from_path(file.path());
        assert_eq!(config.providers.openai.model, "gpt-4o");
        assert_eq!(config.providers.openai.max_retries, Some(5));
        assert_eq!(config.request.max_tokens, 256);
        // Default preserved
        assert_eq!(config.request.temperature, 0.7);
    }

    #[test]
    fn test_load_invalid_json_returns_defaults() {
        let file = write_temp_json("not valid json {{{");
        let config = load_config_from_path(file.path());
        assert_eq!(config.request.max_tokens, 1000);
    }

    #[test]
    fn test_load_empty_json() {
        let file = write_temp_json("{}");
        let config = load_config_from_path(file.path());
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.providers.openai.retry_delay_ms, Some(2000));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = Config::default();
        config.environment = Environment::Production;
        config.providers.openai.api_key = "sk-test-key-0123456789".to_string();

        save_config(&config, Some(&path)).unwrap();

        let reloaded = load_config_from_path(&path);
        assert!(reloaded.environment.is_production());
        assert_eq!(reloaded.providers.openai.api_key, "sk-test-key-0123456789");
    }

    #[test]
    fn test_migrate_retry_delay() {
        let file = write_temp_json(r#"{
            "providers": { "openai": { "retryDelay": 1500 } }
        }"#);

        let config = load_config_from_path(file.path());
        assert_eq!(config.providers.openai.retry_delay_ms, Some(1500));
    }

    #[test]
    fn test_migrate_no_overwrite() {
        let file = write_temp_json(r#"{
            "providers": { "openai": { "retryDelay": 1500, "retryDelayMs": 900 } }
        }"#);

        let config = load_config_from_path(file.path());
        assert_eq!(config.providers.openai.retry_delay_ms, Some(900));
    }

    #[test]
    fn test_env_override_provider_fields() {
        std::env::set_var("ELITE_PROVIDERS__OPENAI__MODEL", "gpt-4o-mini");
        std::env::set_var("ELITE_PROVIDERS__OPENAI__RETRY_DELAY_MS", "750");
        let config = apply_env_overrides(Config::default());
        assert_eq!(config.providers.openai.model, "gpt-4o-mini");
        assert_eq!(config.providers.openai.retry_delay_ms, Some(750));
        std::env::remove_var("ELITE_PROVIDERS__OPENAI__MODEL");
        std::env::remove_var("ELITE_PROVIDERS__OPENAI__RETRY_DELAY_MS");
    }

    #[test]
    fn test_env_override_ignores_unparseable_numbers() {
        std::env::set_var("ELITE_REQUEST__MAX_TOKENS", "lots");
        let config = apply_env_overrides(Config::default());
        assert_eq!(config.request.max_tokens, 1000);
        std::env::remove_var("ELITE_REQUEST__MAX_TOKENS");
    }

    #[test]
    fn test_env_override_environment() {
        std::env::set_var("ELITE_ENVIRONMENT", "prod");
        let config = apply_env_overrides(Config::default());
        assert!(config.environment.is_production());
        std::env::remove_var("ELITE_ENVIRONMENT");
    }

    #[test]
    fn test_saved_json_uses_camel_case() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        save_config(&Config::default(), Some(&path)).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let raw: serde_json::Value = serde_json::from_str(&content).unwrap();

        assert!(raw["providers"]["openai"].get("apiUrl").is_some());
        assert!(raw["providers"]["openai"].get("api_url").is_none());
        assert!(raw["request"].get("maxTokens").is_some());
    }
}
