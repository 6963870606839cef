//! API credential store.

use super::{CredentialBackend, FileCredentialBackend, StoreError};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub struct CredentialStore {
    backend: Arc<dyn CredentialBackend>,
}

impl CredentialStore {
    pub fn new(backend: Arc<dyn CredentialBackend>) -> Self {
        Self { backend }
    }

    /// Store backed by a plain file at `path`
    pub fn at_path(path: PathBuf) -> Self {
        Self::new(Arc::new(FileCredentialBackend::new(path)))
    }

    /// The stored credential, or an empty string when missing or unreadable
    pub async fn load(&self) -> String {
        match self.backend.read().await {
            Ok(Some(raw)) => raw.trim().to_string(),
            Ok(None) => String::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read stored API key");
                String::new()
            }
        }
    }

    /// Overwrite the stored credential
    pub async fn save(&self, credential: &str) -> Result<(), StoreError> {
        self.backend.write(credential).await?;
        info!("API key saved");
        Ok(())
    }
}

/// Masked form for display: last four characters only
pub fn key_hint(credential: &str) -> Option<String> {
    if credential.is_empty() {
        return None;
    }
    let count = credential.chars().count();
    if count > 4 {
        let tail: String = credential.chars().skip(count - 4).collect();
        Some(format!("••••{}", tail))
    } else {
        Some("••••".to_string())
    }
}
