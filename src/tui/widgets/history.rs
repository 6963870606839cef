//! History Widget
//!
//! Lists stored analyses with their selection checkboxes and previews the
//! entry under the cursor.

use crate::storage::history::MAX_ENTRIES;
use crate::tui::app::{App, Focus};
use crate::tui::theme::{Icons, Theme};
use crate::tui::widgets::progress::truncate_string;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Render the history panel
pub fn render_history(frame: &mut Frame, area: Rect, app: &App) {
    let focused = app.focus == Focus::History;
    let context = if app.session.use_history { "on" } else { "off" };

    let block = Block::default()
        .title(format!(
            " History {}/{} · context {} ",
            app.history.len(),
            MAX_ENTRIES,
            context
        ))
        .borders(Borders::ALL)
        .border_style(if focused {
            Theme::border_focused()
        } else {
            Theme::border()
        });

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if app.history.is_empty() {
        let empty = Paragraph::new(Line::from(Span::styled(
            "No analyses stored yet.",
            Theme::text_dim(),
        )));
        frame.render_widget(empty, inner);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Percentage(40)])
        .split(inner);

    let width = chunks[0].width as usize;
    let lines: Vec<Line> = app
        .history
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let checkbox = if app.session.is_history_selected(i) {
                Icons::CHECKED
            } else {
                Icons::UNCHECKED
            };
            let label = format!("{} {} {}", checkbox, short_timestamp(&entry.timestamp), entry.kind);
            let style = if focused && i == app.history_cursor {
                Theme::cursor_row()
            } else if app.session.is_history_selected(i) {
                Theme::text()
            } else {
                Theme::text_dim()
            };
            Line::from(Span::styled(truncate_string(&label, width), style))
        })
        .collect();

    // Keep the cursor row visible
    let visible = chunks[0].height as usize;
    let offset = (app.history_cursor + 1).saturating_sub(visible) as u16;
    frame.render_widget(Paragraph::new(lines).scroll((offset, 0)), chunks[0]);

    if let Some(entry) = app.history.get(app.history_cursor) {
        let preview = Paragraph::new(entry.content.as_str())
            .style(Theme::text_secondary())
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .border_style(Theme::border())
                    .title(Span::styled(" Preview ", Theme::text_dim())),
            );
        frame.render_widget(preview, chunks[1]);
    }
}

/// `2026-10-19 09:00:00` becomes `10-19 09:00`
fn short_timestamp(timestamp: &str) -> &str {
    timestamp.get(5..16).unwrap_or(timestamp)
}
