//! `elite status` — show configuration and provider status.

use anyhow::Result;
use colored::Colorize;

use elite_core::config::{get_config_path, load_config, ProviderSettings};
use elite_core::utils::expand_home;
use elite_providers::registry::{effective_retry_delay_ms, DEFAULT_MAX_RETRIES, PROVIDERS};

/// Run the status command.
pub fn run() -> Result<()> {
    let config = load_config(None);
    let config_path = get_config_path();

    println!();
    println!("{}", "🎓 ELiTE Status".cyan().bold());
    println!();

    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        config_path.display(),
        if config_path.exists() {
            "✓".green().to_string()
        } else {
            "(not found)".red().to_string()
        }
    );
    println!("  {:<18} {}", "Environment:".bold(), config.environment);
    println!(
        "  {:<18} {} | max_tokens: {}",
        "Parameters:".bold(),
        format!("temp: {}", config.request.temperature).dimmed(),
        format!("{}", config.request.max_tokens).dimmed(),
    );

    println!();
    println!("  {}", "Providers:".bold());

    for spec in PROVIDERS {
        let Some(settings) = config.providers.get_by_name(spec.name) else {
            println!("    {:<20} {}", spec.display_name, "· not configured".dimmed());
            continue;
        };

        let key_status = if !settings.is_configured() {
            format!("{}", "· not configured".dimmed())
        } else if !settings.api_key.is_empty() {
            format!("{} (key set inline)", "✓".green())
        } else {
            let key_path = expand_home(settings.api_key_path.as_deref().unwrap_or_default());
            if key_path.exists() {
                format!("{} (key file {})", "✓".green(), key_path.display())
            } else {
                format!("{} key file missing: {}", "✗".red(), key_path.display())
            }
        };

        println!("    {:<20} {}", spec.display_name, key_status);
        println!("      {:<16} {}", "model:", settings.model);
        println!("      {:<16} {}", "endpoint:", settings.api_url);
        println!("      {:<16} {}", "rate limits:", rate_limit_summary(settings));
    }

    println!();

    Ok(())
}

/// Retry budget and base delay as the dispatcher will apply them.
fn rate_limit_summary(settings: &ProviderSettings) -> String {
    format!(
        "{} retries, {} ms base delay",
        settings.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
        effective_retry_delay_ms(settings.retry_delay_ms),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limits_show_configured_values() {
        let settings = ProviderSettings {
            max_retries: Some(5),
            retry_delay_ms: Some(2000),
            ..Default::default()
        };
        assert_eq!(rate_limit_summary(&settings), "5 retries, 2000 ms base delay");
    }

    #[test]
    fn zero_delay_shows_the_delay_actually_used() {
        let settings = ProviderSettings {
            max_retries: None,
            retry_delay_ms: Some(0),
            ..Default::default()
        };
        assert_eq!(rate_limit_summary(&settings), "3 retries, 1000 ms base delay");
    }
}
