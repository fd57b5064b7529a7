//! Shared CLI helpers — answer/error printing, version banner.

use colored::Colorize;

use elite_core::types::NormalizedResponse;
use elite_providers::{format_error_message, DispatchError, RetryNotice};

/// Print an answer to stdout.
pub fn print_answer(response: &NormalizedResponse) {
    println!();
    println!(
        "{} {}",
        "🎓 Answer".cyan().bold(),
        format!("({})", response.source_provider_name).dimmed()
    );
    if response.content.is_empty() {
        println!("{}", "(no response)".dimmed());
    } else {
        println!("{}", response.content);
    }
    println!();
}

/// Print a dispatch failure with the boilerplate prefix removed.
pub fn print_error(error: &DispatchError) {
    eprintln!("\n❌ {}", error_text(error));
    if error.is_transient() {
        eprintln!("{}", "   You can submit the question again.".dimmed());
    }
    eprintln!();
}

/// User-facing text for a dispatch failure.
pub fn error_text(error: &DispatchError) -> String {
    format_error_message(&error.to_string())
}

/// Tell the user a rate-limited question is about to be retried.
pub fn print_retry_notice(notice: &RetryNotice) {
    clear_thinking();
    eprintln!("{}", retry_notice_text(notice).yellow());
}

fn retry_notice_text(notice: &RetryNotice) -> String {
    format!(
        "Rate limit exceeded. Retrying in {} seconds... (Attempt {}/{})",
        notice.delay.as_secs_f64(),
        notice.attempt,
        notice.max_retries
    )
}

/// Print the banner shown at REPL start.
pub fn print_banner(provider: &str) {
    let version = env!("CARGO_PKG_VERSION");
    println!();
    println!("{}  v{}", "🎓 ELiTE".cyan().bold(), version.dimmed());
    println!(
        "{}",
        format!("Asking {provider}. Type an exam question, or \"exit\" to quit.").dimmed()
    );
    println!();
}

/// Print a "thinking" placeholder.
pub fn print_thinking() {
    eprint!("{}", "⠿ thinking...".dimmed());
}

/// Clear the "thinking" placeholder.
pub fn clear_thinking() {
    eprint!("\r{}\r", " ".repeat(40));
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
