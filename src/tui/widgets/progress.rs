//! Progress Widget
//!
//! Displays where the running analysis is.

use crate::models::char_prefix;
use crate::models::AnalysisKind;
use crate::tui::app::TaskStage;
use crate::tui::theme::{Icons, Theme};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Render the progress indicator
pub fn render_progress(frame: &mut Frame, area: Rect, stage: &TaskStage, tab: AnalysisKind) {
    let block = Block::default()
        .title(" Progress ")
        .borders(Borders::ALL)
        .border_style(Theme::border());

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let width = inner.width as usize;
    let lines = vec![
        Line::from(build_progress_line(stage, tab)),
        detail_line(stage, width),
    ];

    frame.render_widget(Paragraph::new(lines), inner);
}

fn detail_line(stage: &TaskStage, width: usize) -> Line<'static> {
    match stage {
        TaskStage::Idle => Line::from(Span::styled(
            "Waiting for input... (Enter or Ctrl+R runs the active tab)",
            Theme::text_dim(),
        )),
        TaskStage::Searching {
            index,
            total,
            keyword,
        } => Line::from(vec![
            Span::styled(
                format!("  Keyword {}/{}: ", (index + 1).min(*total), total),
                Theme::text_dim(),
            ),
            Span::styled(
                truncate_string(keyword, width.saturating_sub(20)),
                Theme::text_secondary(),
            ),
        ]),
        TaskStage::Reading => Line::from(Span::styled("  Reading files...", Theme::text_secondary())),
        TaskStage::Generating(kind) => Line::from(Span::styled(
            format!("  Writing the {} report...", kind.title()),
            Theme::text_secondary(),
        )),
        TaskStage::Exporting(format) => Line::from(Span::styled(
            format!("  Writing {} file...", format.extension().to_uppercase()),
            Theme::text_secondary(),
        )),
        TaskStage::Complete(summary) => Line::from(Span::styled(
            truncate_string(summary, width),
            Theme::complete(),
        )),
        TaskStage::Error(e) => Line::from(Span::styled(
            truncate_string(&format!("Error: {}", e), width),
            Theme::error(),
        )),
    }
}

/// Build the progress line with stage indicators
fn build_progress_line(stage: &TaskStage, tab: AnalysisKind) -> Vec<Span<'static>> {
    let collect = match tab {
        AnalysisKind::WeeklyNews => "Search",
        AnalysisKind::FileAnalysis => "Read",
        AnalysisKind::Integrated => "Collect",
    };
    let stages = [
        (collect, StageState::from_collect(stage)),
        ("Generate", StageState::from_generate(stage)),
        ("Done", StageState::from_done(stage)),
    ];

    let mut spans = Vec::new();

    for (i, (name, state)) in stages.iter().enumerate() {
        let (icon, style) = match state {
            StageState::Complete => (Icons::COMPLETE, Theme::complete()),
            StageState::Active => (Icons::ACTIVE, Theme::active()),
            StageState::Pending => (Icons::PENDING, Theme::pending()),
            StageState::Error => (Icons::ERROR, Theme::error()),
        };

        spans.push(Span::styled(format!("{} ", icon), style));
        spans.push(Span::styled(name.to_string(), style));

        if i < stages.len() - 1 {
            spans.push(Span::styled(format!(" {} ", Icons::ARROW), Theme::text_dim()));
        }
    }

    spans
}

/// State of a task stage
#[derive(Debug, Clone, Copy, PartialEq)]
enum StageState {
    Pending,
    Active,
    Complete,
    Error,
}

impl StageState {
    fn from_collect(stage: &TaskStage) -> Self {
        match stage {
            TaskStage::Idle => StageState::Pending,
            TaskStage::Searching { .. } | TaskStage::Reading => StageState::Active,
            TaskStage::Error(_) => StageState::Error,
            _ => StageState::Complete,
        }
    }

    fn from_generate(stage: &TaskStage) -> Self {
        match stage {
            TaskStage::Idle | TaskStage::Searching { .. } | TaskStage::Reading => {
                StageState::Pending
            }
            TaskStage::Generating(_) => StageState::Active,
            TaskStage::Error(_) => StageState::Error,
            TaskStage::Exporting(_) | TaskStage::Complete(_) => StageState::Complete,
        }
    }

    fn from_done(stage: &TaskStage) -> Self {
        match stage {
            TaskStage::Complete(_) => StageState::Complete,
            TaskStage::Exporting(_) => StageState::Active,
            TaskStage::Error(_) => StageState::Error,
            _ => StageState::Pending,
        }
    }
}

/// Truncate a string to at most `max_chars` characters
pub fn truncate_string(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else if max_chars > 3 {
        format!("{}...", char_prefix(s, max_chars - 3))
    } else {
        char_prefix(s, max_chars).to_string()
    }
}
