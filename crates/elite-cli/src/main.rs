//! ELiTE CLI — entry point.
//!
//! # Commands
//!
//! - `elite ask QUESTION` — ask one exam question and print the answer
//! - `elite repl` — interactive exam question loop
//! - `elite onboard` — create `~/.elite/config.json`
//! - `elite status` — show configuration and provider status

mod helpers;
mod onboard;
mod repl;
mod status;
mod submit;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use elite_core::config::{load_config, Config};
use elite_core::keys::FileKeyProvider;
use elite_providers::{initialize_providers, Dispatcher, HttpTransport};

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// ELiTE — ask an AI model your exam questions
#[derive(Parser)]
#[command(name = "elite", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a single exam question
    Ask {
        /// The question text
        question: String,

        /// Registered provider to ask
        #[arg(short, long, default_value = "openai")]
        provider: String,

        /// Sampling temperature (overrides config)
        #[arg(short, long)]
        temperature: Option<f64>,

        /// Maximum answer tokens (overrides config)
        #[arg(long)]
        max_tokens: Option<u32>,

        /// Print the raw provider response as JSON
        #[arg(long, default_value_t = false)]
        raw: bool,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Ask questions interactively
    Repl {
        /// Registered provider to ask
        #[arg(short, long, default_value = "openai")]
        provider: String,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Initialize configuration
    Onboard,

    /// Show configuration and provider status
    Status,
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ask {
            question,
            provider,
            temperature,
            max_tokens,
            raw,
            logs,
        } => {
            let config = load_config(None);
            init_logging(logs, &config);
            let dispatcher = build_dispatcher(&config).await?;
            let request = submit::build_request(&question, &config.request, temperature, max_tokens);

            info!(provider = %provider, "asking single question");
            let response = submit::submit(&dispatcher, &provider, &request)
                .await
                .map_err(|e| anyhow::anyhow!(helpers::error_text(&e)))?;

            if raw {
                println!("{}", serde_json::to_string_pretty(&response.raw_payload)?);
            } else {
                helpers::print_answer(&response);
            }
            Ok(())
        }
        Commands::Repl { provider, logs } => {
            let config = load_config(None);
            init_logging(logs, &config);
            let dispatcher = build_dispatcher(&config).await?;
            repl::run(dispatcher, &provider, &config.request).await
        }
        Commands::Onboard => onboard::run(),
        Commands::Status => status::run(),
    }
}

/// Read keys, register providers, and wire up the HTTP transport.
///
/// Key problems abort startup; there is no degraded mode.
pub async fn build_dispatcher(config: &Config) -> Result<Dispatcher> {
    let keys = FileKeyProvider::new();
    let registry = initialize_providers(config, &keys)
        .await
        .context("failed to initialize AI services")?;

    let transport = HttpTransport::new(Duration::from_secs(config.transport.timeout_secs))
        .context("failed to build HTTP client")?;

    Ok(Dispatcher::new(Arc::new(registry), Arc::new(transport)))
}

/// Initialize tracing/logging on stderr, keeping stdout for answers.
/// Production environments log JSON.
fn init_logging(verbose: bool, config: &Config) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("elite_cli=debug,elite_core=debug,elite_providers=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    if config.environment.is_production() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .compact()
            .init();
    }
}
