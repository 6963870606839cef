//! Report Export
//!
//! Renders report text into downloadable DOCX or PDF documents and writes
//! them under fixed per-kind file names.

pub mod docx;
pub mod layout;
pub mod pdf;

pub use docx::to_word_document;
pub use pdf::{to_pdf_document, PdfExport};

use crate::config::ExportConfig;
use crate::models::AnalysisKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::info;

pub const REPORT_TITLE: &str = "로봇 산업 분석 리포트";
/// Dashes in the separator under the DOCX header
pub const SEPARATOR_WIDTH: usize = 50;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Word document generation failed: {0}")]
    Docx(String),

    #[error("PDF generation failed: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Nothing to export")]
    EmptyReport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Docx,
    Pdf,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Docx => "docx",
            ExportFormat::Pdf => "pdf",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "docx" | "word" => Ok(ExportFormat::Docx),
            "pdf" => Ok(ExportFormat::Pdf),
            other => Err(format!("Unknown export format: {}", other)),
        }
    }
}

/// A document written to disk
#[derive(Debug, Clone)]
pub struct ExportedFile {
    pub path: PathBuf,
    /// Set when the PDF fell back to a basic font
    pub warning: Option<String>,
}

/// File path a report of `kind` is exported to
pub fn export_path(dir: &Path, kind: AnalysisKind, format: ExportFormat) -> PathBuf {
    dir.join(format!("{}.{}", kind.file_stem(), format.extension()))
}

/// Render `text` and write it to `dir`, overwriting an earlier export of the same kind
pub async fn export_report(
    kind: AnalysisKind,
    format: ExportFormat,
    text: &str,
    config: &ExportConfig,
    dir: &Path,
) -> Result<ExportedFile, ExportError> {
    if text.trim().is_empty() {
        return Err(ExportError::EmptyReport);
    }

    let (bytes, warning) = match format {
        ExportFormat::Docx => (to_word_document(text, &config.docx_font)?, None),
        ExportFormat::Pdf => {
            let export = to_pdf_document(text, config)?;
            (export.bytes, export.warning)
        }
    };

    tokio::fs::create_dir_all(dir).await?;
    let path = export_path(dir, kind, format);
    tokio::fs::write(&path, &bytes).await?;

    info!(path = %path.display(), bytes = bytes.len(), "Report exported");
    Ok(ExportedFile { path, warning })
}
