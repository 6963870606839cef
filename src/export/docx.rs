//! Word (OOXML) rendering with `docx-rs`.

use super::{ExportError, REPORT_TITLE, SEPARATOR_WIDTH};
use crate::models::TIMESTAMP_FORMAT;
use chrono::Local;
use docx_rs::{AlignmentType, Docx, Paragraph, Run, RunFonts};
use std::io::Cursor;
use tracing::info;

/// Render `text` as a .docx document, one paragraph per line
pub fn to_word_document(text: &str, font: &str) -> Result<Vec<u8>, ExportError> {
    let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
    render(text, font, &timestamp)
}

fn render(text: &str, font: &str, timestamp: &str) -> Result<Vec<u8>, ExportError> {
    let fonts = || RunFonts::new().ascii(font).hi_ansi(font).east_asia(font).cs(font);
    let run = |content: &str| Run::new().add_text(content).fonts(fonts());

    let mut docx = Docx::new()
        .add_paragraph(
            Paragraph::new()
                .align(AlignmentType::Center)
                .add_run(run(REPORT_TITLE).bold().size(40)),
        )
        .add_paragraph(Paragraph::new().add_run(run(&format!("생성 일시: {}", timestamp))))
        .add_paragraph(Paragraph::new().add_run(run(&"-".repeat(SEPARATOR_WIDTH))));

    let mut paragraphs = 0usize;
    for line in text.split('\n') {
        docx = docx.add_paragraph(Paragraph::new().add_run(run(line.trim_end_matches('\r'))));
        paragraphs += 1;
    }

    let mut buffer = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buffer)
        .map_err(|e| ExportError::Docx(e.to_string()))?;

    let bytes = buffer.into_inner();
    info!(bytes = bytes.len(), paragraphs, "DOCX rendered");
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use docx_rs::{read_docx, DocumentChild, ParagraphChild, RunChild};

    /// Paragraph texts of a rendered document
    fn paragraphs(bytes: &[u8]) -> Vec<String> {
        let docx = read_docx(bytes).unwrap();
        docx.document
            .children
            .iter()
            .filter_map(|child| match child {
                DocumentChild::Paragraph(p) => Some(
                    p.children
                        .iter()
                        .filter_map(|pc| match pc {
                            ParagraphChild::Run(run) => Some(
                                run.children
                                    .iter()
                                    .filter_map(|rc| match rc {
                                        RunChild::Text(t) => Some(t.text.clone()),
                                        _ => None,
                                    })
                                    .collect::<String>(),
                            ),
                            _ => None,
                        })
                        .collect::<String>(),
                ),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_header_then_one_paragraph_per_line() {
        let bytes = render("## 1. 건설 로봇\n\n- 현장 적용", "Malgun Gothic", "2026-10-19 09:00:00").unwrap();
        let texts = paragraphs(&bytes);

        assert_eq!(texts[0], REPORT_TITLE);
        assert_eq!(texts[1], "생성 일시: 2026-10-19 09:00:00");
        assert_eq!(texts[2], "-".repeat(50));
        assert_eq!(&texts[3..], &["## 1. 건설 로봇", "", "- 현장 적용"]);
    }

    #[test]
    fn test_odd_input_renders() {
        let mut text = String::from("• – — \u{1F916}\r\n");
        text.push_str(&"가".repeat(500));
        let bytes = to_word_document(&text, "Malgun Gothic").unwrap();
        let texts = paragraphs(&bytes);
        assert_eq!(texts[3], "• – — \u{1F916}");
        assert_eq!(texts[4].chars().count(), 500);

        assert!(to_word_document("", "Malgun Gothic").is_ok());
    }
}
