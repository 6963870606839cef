//! Storage backends: flat files on disk and an in-memory variant.

use super::{CredentialBackend, HistoryBackend, StoreError};
use crate::models::HistoryEntry;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tokio::fs;
use tracing::debug;

async fn ensure_parent(path: &Path) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }
    Ok(())
}

/// Credential kept as a raw string in a single file
pub struct FileCredentialBackend {
    path: PathBuf,
}

impl FileCredentialBackend {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl CredentialBackend for FileCredentialBackend {
    async fn read(&self) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(&self.path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, credential: &str) -> Result<(), StoreError> {
        ensure_parent(&self.path).await?;
        fs::write(&self.path, credential).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            fs::set_permissions(&self.path, perms).await?;
        }

        debug!(path = ?self.path, "Credential written");
        Ok(())
    }
}

/// History kept as a pretty-printed JSON array
pub struct JsonHistoryBackend {
    path: PathBuf,
}

impl JsonHistoryBackend {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl HistoryBackend for JsonHistoryBackend {
    async fn load(&self) -> Result<Vec<HistoryEntry>, StoreError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&content)?)
    }

    async fn save(&self, entries: &[HistoryEntry]) -> Result<(), StoreError> {
        ensure_parent(&self.path).await?;
        let content = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, content).await?;
        debug!(path = ?self.path, count = entries.len(), "History written");
        Ok(())
    }
}

/// Process-local backend for tests and throwaway sessions
#[derive(Default)]
pub struct MemoryBackend {
    credential: Mutex<Option<String>>,
    history: Mutex<Vec<HistoryEntry>>,
    fail_writes: AtomicBool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_history(entries: Vec<HistoryEntry>) -> Self {
        Self {
            history: Mutex::new(entries),
            ..Self::default()
        }
    }

    /// Make every subsequent write fail with an I/O error
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Io(std::io::Error::new(
                ErrorKind::PermissionDenied,
                "writes disabled",
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl CredentialBackend for MemoryBackend {
    async fn read(&self) -> Result<Option<String>, StoreError> {
        Ok(self
            .credential
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone())
    }

    async fn write(&self, credential: &str) -> Result<(), StoreError> {
        self.check_writable()?;
        *self.credential.lock().unwrap_or_else(|e| e.into_inner()) = Some(credential.to_string());
        Ok(())
    }
}

#[async_trait]
impl HistoryBackend for MemoryBackend {
    async fn load(&self) -> Result<Vec<HistoryEntry>, StoreError> {
        Ok(self.history.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    async fn save(&self, entries: &[HistoryEntry]) -> Result<(), StoreError> {
        self.check_writable()?;
        *self.history.lock().unwrap_or_else(|e| e.into_inner()) = entries.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry(content: &str) -> HistoryEntry {
        HistoryEntry {
            timestamp: "2026-10-19 10:00:00".to_string(),
            kind: "파일 분석".to_string(),
            content: content.to_string(),
        }
    }

    #[tokio::test]
    async fn test_json_history_roundtrip_keeps_hangul_readable() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested/history.json");
        let backend = JsonHistoryBackend::new(path.clone());

        assert!(backend.load().await.unwrap().is_empty());

        backend.save(&[entry("휴머노이드")]).await.unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("휴머노이드"));
        assert!(raw.contains("\"type\""));
        assert!(raw.contains('\n'));

        let loaded = backend.load().await.unwrap();
        assert_eq!(loaded, vec![entry("휴머노이드")]);
    }

    #[tokio::test]
    async fn test_json_history_malformed_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("history.json");
        std::fs::write(&path, "{not json").unwrap();

        let backend = JsonHistoryBackend::new(path);
        assert!(matches!(backend.load().await, Err(StoreError::Json(_))));
    }

    #[tokio::test]
    async fn test_file_credential_missing_then_written() {
        let temp_dir = TempDir::new().unwrap();
        let backend = FileCredentialBackend::new(temp_dir.path().join(".api_key.txt"));

        assert_eq!(backend.read().await.unwrap(), None);
        backend.write("AIza-test").await.unwrap();
        assert_eq!(backend.read().await.unwrap(), Some("AIza-test".to_string()));
    }

    #[tokio::test]
    async fn test_memory_backend_write_failure() {
        let backend = MemoryBackend::new();
        backend.fail_writes(true);
        assert!(CredentialBackend::write(&backend, "k").await.is_err());
        assert!(HistoryBackend::save(&backend, &[entry("x")]).await.is_err());
        assert!(HistoryBackend::load(&backend).await.unwrap().is_empty());
    }
}
