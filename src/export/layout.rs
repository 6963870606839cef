//! Line layout for PDF output.
//!
//! Greedy word wrapping against an arbitrary glyph measure. Words longer than
//! the line are split at character boundaries.

use crate::models::char_prefix;
use thiserror::Error;

/// Characters kept when a line is retried in truncated form
pub const TRUNCATED_LINE_CHARS: usize = 100;

#[derive(Debug, Error, PartialEq)]
pub enum LayoutError {
    #[error("glyph {0:?} is wider than the line")]
    GlyphTooWide(char),

    #[error("line width must be positive")]
    NoWidth,
}

/// A laid-out row of the document body
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutLine {
    Text(String),
    /// Vertical gap left by an empty source line
    Blank,
}

/// Replace typographic punctuation that basic fonts commonly lack
pub fn normalize_text(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2022}' | '\u{2013}' | '\u{2014}' => '-',
            other => other,
        })
        .collect()
}

fn text_width(text: &str, measure: &impl Fn(char) -> f32) -> f32 {
    text.chars().map(measure).sum()
}

/// Wrap one line into rows no wider than `max_width`
pub fn wrap_line(
    line: &str,
    max_width: f32,
    measure: &impl Fn(char) -> f32,
) -> Result<Vec<String>, LayoutError> {
    if max_width <= 0.0 {
        return Err(LayoutError::NoWidth);
    }
    if let Some(c) = line.chars().find(|&c| measure(c) > max_width) {
        return Err(LayoutError::GlyphTooWide(c));
    }

    let mut rows = Vec::new();
    let mut current = String::new();
    let mut current_width = 0.0_f32;
    let space_width = measure(' ');

    for word in line.split(' ') {
        let word_width = text_width(word, measure);
        let gap = if current.is_empty() { 0.0 } else { space_width };

        if current_width + gap + word_width <= max_width {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
            current_width += gap + word_width;
            continue;
        }

        if !current.is_empty() {
            rows.push(std::mem::take(&mut current));
            current_width = 0.0;
        }

        if word_width <= max_width {
            current.push_str(word);
            current_width = word_width;
            continue;
        }

        // Hard-split an unbreakable word
        for c in word.chars() {
            let w = measure(c);
            if current_width + w > max_width && !current.is_empty() {
                rows.push(std::mem::take(&mut current));
                current_width = 0.0;
            }
            current.push(c);
            current_width += w;
        }
    }

    if !current.is_empty() || rows.is_empty() {
        rows.push(current);
    }
    Ok(rows)
}

/// Lay out a whole report. Lines that cannot be wrapped are retried truncated
/// and dropped if that fails too; each drop is reported.
pub fn layout_text(
    text: &str,
    max_width: f32,
    measure: &impl Fn(char) -> f32,
) -> (Vec<LayoutLine>, Vec<String>) {
    let mut lines = Vec::new();
    let mut skipped = Vec::new();

    for (number, line) in text.split('\n').enumerate() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            lines.push(LayoutLine::Blank);
            continue;
        }

        let rows = wrap_line(line, max_width, measure).or_else(|_| {
            let truncated = format!("{}...", char_prefix(line, TRUNCATED_LINE_CHARS));
            wrap_line(&truncated, max_width, measure)
        });

        match rows {
            Ok(rows) => lines.extend(rows.into_iter().map(LayoutLine::Text)),
            Err(e) => skipped.push(format!("line {} skipped: {}", number + 1, e)),
        }
    }

    (lines, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(_: char) -> f32 {
        1.0
    }

    fn texts(lines: &[LayoutLine]) -> Vec<&str> {
        lines
            .iter()
            .filter_map(|l| match l {
                LayoutLine::Text(t) => Some(t.as_str()),
                LayoutLine::Blank => None,
            })
            .collect()
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("• a – b — c"), "- a - b - c");
        assert_eq!(normalize_text("로봇"), "로봇");
    }

    #[test]
    fn test_wrap_at_spaces() {
        let rows = wrap_line("aaa bbb ccc", 7.0, &unit).unwrap();
        assert_eq!(rows, vec!["aaa bbb", "ccc"]);
    }

    #[test]
    fn test_long_token_is_hard_split() {
        let token = "x".repeat(500);
        let rows = wrap_line(&token, 80.0, &unit).unwrap();
        assert_eq!(rows.len(), 7);
        assert!(rows.iter().all(|r| r.chars().count() <= 80));
        assert_eq!(rows.concat(), token);
    }

    #[test]
    fn test_multibyte_split_keeps_code_points() {
        let rows = wrap_line("휴머노이드로봇", 3.0, &unit).unwrap();
        assert_eq!(rows, vec!["휴머노", "이드로", "봇"]);
    }

    #[test]
    fn test_glyph_wider_than_line_fails() {
        let measure = |c: char| if c == 'W' { 10.0 } else { 1.0 };
        assert_eq!(wrap_line("aWb", 5.0, &measure), Err(LayoutError::GlyphTooWide('W')));
        assert_eq!(wrap_line("a", 0.0, &unit), Err(LayoutError::NoWidth));
    }

    #[test]
    fn test_layout_blank_lines_and_skips() {
        let measure = |c: char| if c == 'W' { 10.0 } else { 1.0 };
        let (lines, skipped) = layout_text("first\n\n  \nW\nlast", 5.0, &measure);

        assert_eq!(lines[1], LayoutLine::Blank);
        assert_eq!(lines[2], LayoutLine::Blank);
        assert_eq!(texts(&lines), vec!["first", "last"]);
        assert_eq!(skipped.len(), 1);
        assert!(skipped[0].starts_with("line 4"));
    }

    #[test]
    fn test_truncated_retry_recovers_line() {
        // The wide glyph sits past the first 100 characters, so the retry fits
        let mut line = "a".repeat(150);
        line.push('W');
        let measure = |c: char| if c == 'W' { 500.0 } else { 1.0 };
        let (lines, skipped) = layout_text(&line, 200.0, &measure);

        assert!(skipped.is_empty());
        assert_eq!(texts(&lines), vec![format!("{}...", "a".repeat(100)).as_str()]);
    }

    #[test]
    fn test_empty_text_is_one_blank() {
        let (lines, skipped) = layout_text("", 100.0, &unit);
        assert_eq!(lines, vec![LayoutLine::Blank]);
        assert!(skipped.is_empty());
    }
}
