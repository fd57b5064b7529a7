//! Core building blocks for ELiTE.
//!
//! - [`types`] — ask request, normalized response, chat completions wire types
//! - [`config`] — JSON config file + env var overrides
//! - [`keys`] — API key loading with a per-identifier cache
//! - [`utils`] — path and string helpers

pub mod config;
pub mod keys;
pub mod types;
pub mod utils;
