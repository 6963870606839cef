//! Document Extraction
//!
//! Turns uploaded PDF and plain-text files into raw text for file analysis.
//! Other file types are skipped without error.

use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Failed to read {name}: {source}")]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("PDF processing failed ({name}): {message}")]
    Pdf { name: String, message: String },

    #[error("{name} is not valid UTF-8 text")]
    Encoding { name: String },
}

/// A file handed in by the operator
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Read a file from disk, guessing its content type from the extension
    pub async fn from_path(path: &Path) -> Result<Self, ExtractError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| ExtractError::Read {
                name: name.clone(),
                source,
            })?;

        let content_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();

        Ok(Self {
            name,
            content_type,
            bytes,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileKind {
    Pdf,
    Text,
    Unsupported,
}

fn classify(file: &UploadedFile) -> FileKind {
    let declared = file
        .content_type
        .parse::<mime::Mime>()
        .ok()
        .map(|m| m.essence_str().to_string());

    let content_type = match declared.as_deref() {
        Some("application/octet-stream") | Some("") | None => mime_guess::from_path(&file.name)
            .first_or_octet_stream()
            .essence_str()
            .to_string(),
        Some(other) => other.to_string(),
    };

    if content_type == mime::APPLICATION_PDF.essence_str() {
        FileKind::Pdf
    } else if content_type == mime::TEXT_PLAIN.essence_str() {
        FileKind::Text
    } else {
        FileKind::Unsupported
    }
}

/// Raw text of one file; `Ok(None)` for unsupported types
pub fn extract(file: &UploadedFile) -> Result<Option<String>, ExtractError> {
    match classify(file) {
        FileKind::Pdf => extract_pdf(file).map(Some),
        FileKind::Text => String::from_utf8(file.bytes.clone())
            .map(Some)
            .map_err(|_| ExtractError::Encoding {
                name: file.name.clone(),
            }),
        FileKind::Unsupported => {
            debug!(file = %file.name, content_type = %file.content_type, "Skipping unsupported file");
            Ok(None)
        }
    }
}

fn extract_pdf(file: &UploadedFile) -> Result<String, ExtractError> {
    let pdf_error = |e: lopdf::Error| ExtractError::Pdf {
        name: file.name.clone(),
        message: e.to_string(),
    };

    let document = lopdf::Document::load_mem(&file.bytes).map_err(pdf_error)?;

    let mut text = String::new();
    for page_number in document.get_pages().keys() {
        let page_text = document.extract_text(&[*page_number]).map_err(pdf_error)?;
        text.push_str(&page_text);
        text.push('\n');
    }

    debug!(file = %file.name, chars = text.chars().count(), "PDF text extracted");
    Ok(text)
}

/// Concatenated text of several files plus per-file failures
#[derive(Debug, Clone, Default)]
pub struct BatchExtraction {
    pub text: String,
    pub warnings: Vec<String>,
    /// Names of the files that contributed text
    pub used_files: Vec<String>,
}

/// Extract every file in order, each under a `=== name ===` header
pub fn extract_batch(files: &[UploadedFile]) -> BatchExtraction {
    let mut batch = BatchExtraction::default();

    for file in files {
        match extract(file) {
            Ok(Some(text)) => {
                batch.text.push_str(&format!("\n\n=== {} ===\n{}", file.name, text));
                batch.used_files.push(file.name.clone());
            }
            Ok(None) => {}
            Err(e) => {
                warn!(file = %file.name, error = %e, "File extraction failed");
                batch.warnings.push(e.to_string());
            }
        }
    }

    info!(
        files = files.len(),
        used = batch.used_files.len(),
        failures = batch.warnings.len(),
        "Document extraction completed"
    );
    batch
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};
    use tempfile::TempDir;

    /// Single-page PDF per entry of `pages`, using a built-in font
    fn sample_pdf(pages: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for text in pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![72.into(), 720.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => pages.len() as i64,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_plain_text_is_returned_verbatim() {
        let file = UploadedFile::new("notes.txt", "text/plain", "로봇 시장 메모".as_bytes().to_vec());
        assert_eq!(extract(&file).unwrap().as_deref(), Some("로봇 시장 메모"));
    }

    #[test]
    fn test_invalid_utf8_text_is_an_error() {
        let file = UploadedFile::new("bad.txt", "text/plain", vec![0xff, 0xfe, 0x00]);
        assert!(matches!(extract(&file), Err(ExtractError::Encoding { .. })));
    }

    #[test]
    fn test_unsupported_types_are_skipped() {
        let file = UploadedFile::new("photo.png", "image/png", vec![1, 2, 3]);
        assert!(extract(&file).unwrap().is_none());
    }

    #[test]
    fn test_content_type_falls_back_to_file_name() {
        let file = UploadedFile::new("memo.txt", "application/octet-stream", b"hi".to_vec());
        assert_eq!(extract(&file).unwrap().as_deref(), Some("hi"));
    }

    #[test]
    fn test_pdf_pages_are_newline_terminated() {
        let file = UploadedFile::new("report.pdf", "application/pdf", sample_pdf(&["Alpha", "Beta"]));
        let text = extract(&file).unwrap().unwrap();

        assert!(text.ends_with('\n'));
        let alpha = text.find("Alpha").unwrap();
        let beta = text.find("Beta").unwrap();
        assert!(alpha < beta);
    }

    #[test]
    fn test_corrupt_pdf_is_an_error() {
        let file = UploadedFile::new("broken.pdf", "application/pdf", b"%PDF-1.4 garbage".to_vec());
        assert!(matches!(extract(&file), Err(ExtractError::Pdf { .. })));
    }

    #[test]
    fn test_batch_concatenates_in_order_and_collects_failures() {
        let files = vec![
            UploadedFile::new("a.txt", "text/plain", b"first".to_vec()),
            UploadedFile::new("broken.pdf", "application/pdf", b"not a pdf".to_vec()),
            UploadedFile::new("image.png", "image/png", vec![0]),
            UploadedFile::new("b.txt", "text/plain", b"second".to_vec()),
        ];
        let batch = extract_batch(&files);

        assert_eq!(batch.text, "\n\n=== a.txt ===\nfirst\n\n=== b.txt ===\nsecond");
        assert_eq!(batch.used_files, vec!["a.txt", "b.txt"]);
        assert_eq!(batch.warnings.len(), 1);
        assert!(batch.warnings[0].contains("broken.pdf"));
    }

    #[tokio::test]
    async fn test_from_path_guesses_content_type() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("brief.txt");
        std::fs::write(&path, "brief").unwrap();

        let file = UploadedFile::from_path(&path).await.unwrap();
        assert_eq!(file.name, "brief.txt");
        assert_eq!(file.content_type, "text/plain");
        assert_eq!(file.bytes, b"brief");

        let missing = UploadedFile::from_path(&temp_dir.path().join("nope.pdf")).await;
        assert!(matches!(missing, Err(ExtractError::Read { .. })));
    }
}
