//! `elite onboard` — initialize configuration.
//!
//! - Creates `~/.elite/config.json` with defaults
//! - Creates the history directory
//! - Points at the API key file to fill in

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use elite_core::config::{load_config, save_config};
use elite_core::utils::{expand_home, get_data_path};

/// Run the onboard command.
pub fn run() -> Result<()> {
    println!();
    println!("{}", "🎓 ELiTE — Setup".cyan().bold());
    println!();

    setup(&get_data_path())?;

    println!();
    println!(
        "{}",
        "  Setup complete! Run `elite repl` to start asking questions.".green()
    );
    println!();

    Ok(())
}

/// Create config and directories under `data_dir`, keeping anything that exists.
fn setup(data_dir: &Path) -> Result<()> {
    let config_path = data_dir.join("config.json");

    if config_path.exists() {
        println!(
            "  {} config already exists at {}",
            "✓".green(),
            config_path.display()
        );
    } else {
        let config = load_config(Some(&config_path)); // defaults + env
        save_config(&config, Some(&config_path))?;
        println!(
            "  {} created config at {}",
            "✓".green(),
            config_path.display()
        );
    }

    let history_dir = data_dir.join("history");
    std::fs::create_dir_all(&history_dir)?;
    println!("  {} history dir at {}", "✓".green(), history_dir.display());

    let config = load_config(Some(&config_path));
    let openai = &config.providers.openai;
    if !openai.api_key.is_empty() {
        println!("  {} OpenAI key set inline", "✓".green());
    } else if let Some(path) = openai.api_key_path.as_deref() {
        let key_path = expand_home(path);
        if key_path.exists() {
            println!("  {} OpenAI key file at {}", "✓".green(), key_path.display());
        } else {
            println!(
                "  {} put your OpenAI API key in {}",
                "!".yellow(),
                key_path.display()
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_creates_config_and_history() {
        let dir = tempfile::tempdir().unwrap();
        setup(dir.path()).unwrap();

        assert!(dir.path().join("config.json").exists());
        assert!(dir.path().join("history").is_dir());

        let raw: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(dir.path().join("config.json")).unwrap(),
        )
        .unwrap();
        assert!(raw["providers"]["openai"].get("model").is_some());
    }

    #[test]
    fn setup_keeps_existing_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"providers":{"openai":{"model":"gpt-4o"}}}"#).unwrap();

        setup(dir.path()).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("gpt-4o"));
        assert!(!content.contains("apiUrl"));
    }
}
