// Core data models

use serde::{Deserialize, Serialize};

/// Timestamp format used for history entries and export headers
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single news item discovered for a keyword
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub snippet: String,
    pub url: String,
    /// Keyword whose search surfaced this item first
    pub keyword: String,
}

/// News gathered for one weekly report, split by topical priority
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewsBatch {
    /// Group A: construction robots and humanoids
    pub primary: Vec<SearchResult>,
    /// Group B: everything else
    pub secondary: Vec<SearchResult>,
}

impl NewsBatch {
    pub fn total(&self) -> usize {
        self.primary.len() + self.secondary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primary.is_empty() && self.secondary.is_empty()
    }
}

/// Kind of analysis a report came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalysisKind {
    WeeklyNews,
    FileAnalysis,
    Integrated,
}

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 3] = [
        AnalysisKind::WeeklyNews,
        AnalysisKind::FileAnalysis,
        AnalysisKind::Integrated,
    ];

    /// Label written into the history file's `type` field
    pub fn history_label(self) -> &'static str {
        match self {
            AnalysisKind::WeeklyNews => "주간 뉴스 분석",
            AnalysisKind::FileAnalysis => "파일 분석",
            AnalysisKind::Integrated => "통합 분석",
        }
    }

    /// File name (without extension) used when exporting
    pub fn file_stem(self) -> &'static str {
        match self {
            AnalysisKind::WeeklyNews => "주간_로봇_산업_분석",
            AnalysisKind::FileAnalysis => "파일_분석_리포트",
            AnalysisKind::Integrated => "통합_분석_리포트",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            AnalysisKind::WeeklyNews => "Weekly News",
            AnalysisKind::FileAnalysis => "File Analysis",
            AnalysisKind::Integrated => "Integrated",
        }
    }
}

impl std::fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.history_label())
    }
}

/// A truncated record of a previously generated report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
}

/// First `max_chars` characters of `s`, never splitting a code point
pub fn char_prefix(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
