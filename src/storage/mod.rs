//! Local Storage
//!
//! Persistence for the API credential and the analysis history. Both stores
//! talk to an injectable backend so the flat-file layout can be swapped
//! (tests use the in-memory backend).

pub mod backend;
pub mod credential;
pub mod history;

pub use backend::{FileCredentialBackend, JsonHistoryBackend, MemoryBackend};
pub use credential::{key_hint, CredentialStore};
pub use history::{HistoryStore, NO_HISTORY, NO_SELECTED_HISTORY};

use crate::models::HistoryEntry;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed history data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Index {index} out of range (len {len})")]
    OutOfRange { index: usize, len: usize },
}

/// Raw credential persistence
#[async_trait]
pub trait CredentialBackend: Send + Sync {
    /// `Ok(None)` when nothing has been stored yet
    async fn read(&self) -> Result<Option<String>, StoreError>;
    async fn write(&self, credential: &str) -> Result<(), StoreError>;
}

/// Whole-list history persistence
#[async_trait]
pub trait HistoryBackend: Send + Sync {
    /// An empty list when nothing has been stored yet
    async fn load(&self) -> Result<Vec<HistoryEntry>, StoreError>;
    /// Replace the stored list
    async fn save(&self, entries: &[HistoryEntry]) -> Result<(), StoreError>;
}
