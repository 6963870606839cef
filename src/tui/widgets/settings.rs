//! Settings Widget
//!
//! Modal dialog for the Gemini API key and the search keyword lists.

use crate::tui::app::{App, SettingsField};
use crate::tui::theme::{Icons, Theme};
use crate::tui::ui::centered_rect;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

/// Render the settings modal
pub fn render_settings(frame: &mut Frame, app: &App) {
    let area = centered_rect(80, 85, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(" Settings ")
        .borders(Borders::ALL)
        .border_style(Theme::border_focused());

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(2),  // Instructions
            Constraint::Length(3),  // API key
            Constraint::Min(4),     // Construction keywords
            Constraint::Min(4),     // Humanoid keywords
            Constraint::Min(4),     // Other keywords
            Constraint::Length(1),  // Footer
        ])
        .split(inner);

    render_instructions(frame, chunks[0]);
    render_api_key(frame, chunks[1], app);
    for (slot, field) in [
        SettingsField::Construction,
        SettingsField::Humanoid,
        SettingsField::Other,
    ]
    .into_iter()
    .enumerate()
    {
        render_keyword_list(frame, chunks[2 + slot], app, field, slot);
    }
    render_footer(frame, chunks[5], app);
}

fn render_instructions(frame: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(Span::styled(
            "The API key is stored locally. Keyword edits apply when settings close.",
            Theme::text(),
        )),
        Line::from(vec![
            Span::styled("[Tab]", Theme::shortcut_key()),
            Span::styled(" Next ", Theme::shortcut_desc()),
            Span::styled("[e]", Theme::shortcut_key()),
            Span::styled(" Edit key ", Theme::shortcut_desc()),
            Span::styled("[Enter]", Theme::shortcut_key()),
            Span::styled(" Save / new line ", Theme::shortcut_desc()),
            Span::styled("[Esc]", Theme::shortcut_key()),
            Span::styled(" Close", Theme::shortcut_desc()),
        ]),
    ];

    frame.render_widget(Paragraph::new(lines), area);
}

fn render_api_key(frame: &mut Frame, area: Rect, app: &App) {
    let is_selected = app.settings_field() == SettingsField::ApiKey;
    let prefix = if is_selected { Icons::SELECTED } else { " " };

    let status = if app.has_credential() {
        Span::styled(format!(" {} Configured ", Icons::COMPLETE), Theme::badge_success())
    } else {
        Span::styled(format!(" {} Not set", Icons::PENDING), Theme::text_dim())
    };

    let mut lines = vec![Line::from(vec![
        Span::styled(
            format!("{} ", prefix),
            if is_selected { Theme::selected() } else { Theme::text_dim() },
        ),
        Span::styled(
            format!("{:<16}", SettingsField::ApiKey.label()),
            if is_selected { Theme::selected() } else { Theme::text() },
        ),
        status,
    ])];

    if is_selected && app.settings_show_input {
        let input_display = if app.settings_input.is_empty() {
            "Enter API key...".to_string()
        } else {
            Icons::DOT.repeat(app.settings_input.chars().count())
        };
        lines.push(Line::from(vec![
            Span::raw("    "),
            Span::styled(format!("[{}]", input_display), Theme::warning()),
            Span::styled(" ", Theme::text()),
            Span::styled(Icons::CURSOR, Theme::active()),
        ]));
    } else if let Some(hint) = app.credential_hint() {
        lines.push(Line::from(vec![
            Span::raw("    "),
            Span::styled(format!("Key: {}", hint), Theme::text_dim()),
            Span::styled("  [e] to change", Theme::text_dim()),
        ]));
    } else {
        lines.push(Line::from(vec![
            Span::raw("    "),
            Span::styled("Press [e] to enter API key", Theme::text_dim()),
        ]));
    }

    frame.render_widget(Paragraph::new(lines), area);
}

fn render_keyword_list(frame: &mut Frame, area: Rect, app: &App, field: SettingsField, slot: usize) {
    let is_selected = app.settings_field() == field;
    let count = app.keyword_inputs[slot]
        .lines()
        .iter()
        .filter(|line| !line.trim().is_empty())
        .count();

    let block = Block::default()
        .title(format!(" {} ({}) ", field.label(), count))
        .borders(Borders::ALL)
        .border_style(if is_selected {
            Theme::border_focused()
        } else {
            Theme::border()
        });

    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(&app.keyword_inputs[slot], inner);
}

fn render_footer(frame: &mut Frame, area: Rect, app: &App) {
    let help_text = match app.settings_field() {
        SettingsField::ApiKey if app.settings_show_input => {
            "Type your API key, then press Enter to save"
        }
        SettingsField::ApiKey if app.has_credential() => {
            "Press [e] to change the key, or Tab to edit keywords"
        }
        SettingsField::ApiKey => "Press [e] to enter a Gemini API key",
        _ => "One keyword per line. Construction and humanoid keywords form the priority group",
    };

    let line = Line::from(Span::styled(help_text, Theme::text_secondary()));
    frame.render_widget(Paragraph::new(line), area);
}
