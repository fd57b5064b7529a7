//! Provider layer for ELiTE.
//!
//! # Architecture
//!
//! - [`registry`] — static provider specs + the runtime name → config table
//! - [`openai`] — OpenAI chat completions request/response mapping
//! - [`transport::Transport`] — single HTTP POST, with a `reqwest` implementation
//! - [`dispatcher::Dispatcher`] — validation, dispatch, 429 retry with backoff
//! - [`init::initialize_providers`] — startup: keys + config → registry
//! - [`display::format_error_message`] — trims error text for display

pub mod dispatcher;
pub mod display;
pub mod error;
pub mod init;
pub mod openai;
pub mod registry;
pub mod transport;

// Re-export main types for convenience
pub use dispatcher::{Dispatcher, RetryNotice};
pub use display::format_error_message;
pub use error::{DispatchError, ErrorKind, InitError};
pub use init::initialize_providers;
pub use registry::{ProviderConfig, ProviderRegistry, ProviderSpec, PROVIDERS};
pub use transport::{HttpTransport, Transport, TransportFailure};
