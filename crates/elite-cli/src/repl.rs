//! Interactive exam question loop.
//!
//! Uses `rustyline` for readline-style editing with persistent history.
//! Each non-empty line is one submission.

use anyhow::Result;
use rustyline::config::Configurer;
use rustyline::history::DefaultHistory;
use rustyline::{DefaultEditor, Editor};
use tracing::debug;

use elite_core::config::schema::RequestDefaults;
use elite_providers::Dispatcher;

use crate::{helpers, submit};

/// Exit commands (case-insensitive match).
const EXIT_COMMANDS: &[&str] = &["exit", "quit", "/exit", "/quit", ":q"];

/// Run the interactive loop.
pub async fn run(dispatcher: Dispatcher, provider: &str, defaults: &RequestDefaults) -> Result<()> {
    helpers::print_banner(provider);

    let mut editor = create_editor()?;

    loop {
        let input = match editor.readline("Question: ") {
            Ok(line) => line,
            Err(rustyline::error::ReadlineError::Interrupted) => break,
            Err(rustyline::error::ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Input error: {e}");
                break;
            }
        };

        let trimmed = input.trim();
        if trimmed.is_empty() {
            continue;
        }

        if is_exit_command(trimmed) {
            println!("\nGoodbye! 👋");
            break;
        }

        let _ = editor.add_history_entry(&input);

        debug!(provider, question_len = trimmed.len(), "submitting question");
        helpers::print_thinking();

        let request = submit::build_request(trimmed, defaults, None, None);
        let result = submit::submit(&dispatcher, provider, &request).await;
        helpers::clear_thinking();

        match result {
            Ok(response) => helpers::print_answer(&response),
            Err(e) => helpers::print_error(&e),
        }
    }

    save_history(&mut editor);

    Ok(())
}

/// Create a rustyline editor with history.
fn create_editor() -> Result<Editor<(), DefaultHistory>> {
    let mut editor = DefaultEditor::new()?;
    editor.set_max_history_size(1000)?;

    let history_path = history_path();
    if history_path.exists() {
        let _ = editor.load_history(&history_path);
        debug!("loaded REPL history from {}", history_path.display());
    }

    Ok(editor)
}

/// Save history to disk.
fn save_history(editor: &mut Editor<(), DefaultHistory>) {
    let path = history_path();
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    if let Err(e) = editor.save_history(&path) {
        debug!("failed to save history: {e}");
    }
}

/// Path to the history file.
fn history_path() -> std::path::PathBuf {
    elite_core::utils::get_data_path()
        .join("history")
        .join("questions")
}

/// Check if input is an exit command.
fn is_exit_command(input: &str) -> bool {
    let lower = input.to_lowercase();
    EXIT_COMMANDS.contains(&lower.as_str())
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
