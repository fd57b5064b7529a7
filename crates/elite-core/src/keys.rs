//! API key loading.
//!
//! Keys live in plain text files (one key per file, surrounding whitespace
//! ignored). A [`FileKeyProvider`] reads each file at most once per process
//! and serves later lookups from its cache.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::utils::expand_home;

/// Supplies secrets by logical identifier.
///
/// Read failures are not errors at this level: they yield an empty string
/// and the caller decides whether that is fatal.
#[async_trait]
pub trait KeyProvider: Send + Sync {
    async fn get_secret(&self, identifier: &str) -> String;
}

/// Reads keys from files, using the identifier as the path.
#[derive(Debug, Default)]
pub struct FileKeyProvider {
    cache: RwLock<HashMap<String, String>>,
}

impl FileKeyProvider {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    async fn cached(&self) -> usize {
        self.cache.read().await.len()
    }
}

#[async_trait]
impl KeyProvider for FileKeyProvider {
    async fn get_secret(&self, identifier: &str) -> String {
        if let Some(key) = self.cache.read().await.get(identifier) {
            return key.clone();
        }

        let path = expand_home(identifier);
        match tokio::fs::read_to_string(&path).await {
            Ok(raw) => {
                let key = raw.trim().to_string();
                // Empty files are not cached so a later fix is picked up.
                if !key.is_empty() {
                    self.cache
                        .write()
                        .await
                        .insert(identifier.to_string(), key.clone());
                }
                debug!(path = %path.display(), "API key loaded");
                key
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Error reading API key");
                String::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn key_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[tokio::test]
    async fn test_reads_and_trims_key() {
        let file = key_file("  sk-abcdefghijklmnopqrstuvwxyz\n");
        let provider = FileKeyProvider::new();
        let key = provider.get_secret(file.path().to_str().unwrap()).await;
        assert_eq!(key, "sk-abcdefghijklmnopqrstuvwxyz");
    }

    #[tokio::test]
    async fn test_missing_file_yields_empty() {
        let provider = FileKeyProvider::new();
        let key = provider.get_secret("/nonexistent/elite/openai.key").await;
        assert!(key.is_empty());
        assert_eq!(provider.cached().await, 0);
    }

    #[tokio::test]
    async fn test_key_is_cached() {
        let file = key_file("sk-first-value-000000000");
        let path = file.path().to_str().unwrap().to_string();
        let provider = FileKeyProvider::new();

        assert_eq!(provider.get_secret(&path).await, "sk-first-value-000000000");

        // Rewrite the file; the cached value must win.
        std::fs::write(&path, "sk-second-value-11111111").unwrap();
        assert_eq!(provider.get_secret(&path).await, "sk-first-value-000000000");
        assert_eq!(provider.cached().await, 1);
    }

    #[tokio::test]
    async fn test_empty_file_not_cached() {
        let file = key_file("   \n");
        let path = file.path().to_str().unwrap().to_string();
        let provider = FileKeyProvider::new();

        assert!(provider.get_secret(&path).await.is_empty());
        assert_eq!(provider.cached().await, 0);

        std::fs::write(&path, "sk-now-present-222222222").unwrap();
        assert_eq!(provider.get_secret(&path).await, "sk-now-present-222222222");
    }
}
