//! Analysis history store.
//!
//! Keeps at most [`MAX_ENTRIES`] truncated reports so later analyses can be
//! given continuity context. Every mutation rewrites the whole list.

use super::{HistoryBackend, JsonHistoryBackend, StoreError};
use crate::models::{char_prefix, AnalysisKind, HistoryEntry, TIMESTAMP_FORMAT};
use chrono::Local;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

pub const MAX_ENTRIES: usize = 10;
/// Characters of a report kept in a history entry
pub const CONTENT_LIMIT: usize = 1000;
/// Characters of an entry shown in a digest
pub const DIGEST_PREVIEW: usize = 200;
/// Entries summarized when no selection is given
pub const DEFAULT_DIGEST_COUNT: usize = 5;

pub const NO_HISTORY: &str = "이전 분석 기록이 없습니다.";
pub const NO_SELECTED_HISTORY: &str = "선택된 이전 분석 기록이 없습니다.";

#[derive(Clone)]
pub struct HistoryStore {
    backend: Arc<dyn HistoryBackend>,
}

impl HistoryStore {
    pub fn new(backend: Arc<dyn HistoryBackend>) -> Self {
        Self { backend }
    }

    /// Store backed by a JSON file at `path`
    pub fn at_path(path: PathBuf) -> Self {
        Self::new(Arc::new(JsonHistoryBackend::new(path)))
    }

    /// All entries, oldest first. Unreadable or malformed data counts as empty.
    pub async fn load(&self) -> Vec<HistoryEntry> {
        match self.backend.load().await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable analysis history");
                Vec::new()
            }
        }
    }

    /// Record a report, dropping the oldest entries to stay within capacity
    pub async fn append(&self, kind: AnalysisKind, content: &str) -> Result<(), StoreError> {
        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        self.append_entry(HistoryEntry {
            timestamp,
            kind: kind.history_label().to_string(),
            content: char_prefix(content, CONTENT_LIMIT).to_string(),
        })
        .await
    }

    async fn append_entry(&self, entry: HistoryEntry) -> Result<(), StoreError> {
        let mut entries = self.load().await;
        if entries.len() >= MAX_ENTRIES {
            let excess = entries.len() + 1 - MAX_ENTRIES;
            entries.drain(..excess);
        }
        entries.push(entry);
        self.backend.save(&entries).await?;
        info!(count = entries.len(), "Analysis saved to history");
        Ok(())
    }

    /// Remove the entry at `index`; false when out of range or not persisted
    pub async fn delete(&self, index: usize) -> bool {
        match self.try_delete(index).await {
            Ok(()) => true,
            Err(e) => {
                warn!(index, error = %e, "History delete failed");
                false
            }
        }
    }

    async fn try_delete(&self, index: usize) -> Result<(), StoreError> {
        let mut entries = self.load().await;
        if index >= entries.len() {
            return Err(StoreError::OutOfRange {
                index,
                len: entries.len(),
            });
        }
        entries.remove(index);
        self.backend.save(&entries).await
    }

    /// Human-readable digest of the selected entries (default: the last five)
    pub async fn summarize(&self, selection: Option<&[usize]>) -> String {
        let entries = self.load().await;
        summarize_entries(&entries, selection)
    }
}

/// Build the digest text for `entries`; out-of-range indices are skipped
pub fn summarize_entries(entries: &[HistoryEntry], selection: Option<&[usize]>) -> String {
    if entries.is_empty() {
        return NO_HISTORY.to_string();
    }

    let selected: Vec<&HistoryEntry> = match selection {
        Some(indices) => indices.iter().filter_map(|&i| entries.get(i)).collect(),
        None => entries
            .iter()
            .skip(entries.len().saturating_sub(DEFAULT_DIGEST_COUNT))
            .collect(),
    };

    if selected.is_empty() {
        return NO_SELECTED_HISTORY.to_string();
    }

    let mut digest = String::from("=== 이전 분석 히스토리 ===\n\n");
    for (n, entry) in selected.iter().enumerate() {
        let _ = writeln!(digest, "{}. [{}] {}", n + 1, entry.timestamp, entry.kind);
        let _ = writeln!(
            digest,
            "   요약: {}...\n",
            char_prefix(&entry.content, DIGEST_PREVIEW)
        );
    }
    digest
}
