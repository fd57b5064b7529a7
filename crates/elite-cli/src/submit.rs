//! One user submission: build the request, send it, cancel on Ctrl+C.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use elite_core::config::schema::RequestDefaults;
use elite_core::types::{AskRequest, NormalizedResponse};
use elite_providers::{DispatchError, Dispatcher};

use crate::helpers;

/// Build a request from the question text, preferring explicit overrides
/// over configured defaults.
pub fn build_request(
    question: &str,
    defaults: &RequestDefaults,
    temperature: Option<f64>,
    max_tokens: Option<u32>,
) -> AskRequest {
    AskRequest::new(question)
        .with_temperature(temperature.unwrap_or(defaults.temperature))
        .with_max_tokens(max_tokens.unwrap_or(defaults.max_tokens))
}

/// Send one request, printing a notice before each rate-limit retry.
/// Ctrl+C while waiting abandons it, including any pending retries.
pub async fn submit(
    dispatcher: &Dispatcher,
    provider: &str,
    request: &AskRequest,
) -> Result<NormalizedResponse, DispatchError> {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("received Ctrl+C, abandoning request");
            trigger.cancel();
        }
    });

    let (progress_tx, mut progress_rx) = mpsc::unbounded_channel();
    let reporter = tokio::spawn(async move {
        while let Some(notice) = progress_rx.recv().await {
            helpers::print_retry_notice(&notice);
        }
    });

    let result = dispatcher
        .send_with_progress(provider, request, &cancel, progress_tx)
        .await;
    watcher.abort();
    // The dispatcher dropped its sender, so the reporter drains and exits.
    let _ = reporter.await;
    result
}
