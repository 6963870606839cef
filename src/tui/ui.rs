//! UI Rendering
//!
//! Main UI layout and rendering logic for the dashboard.

use crate::export::layout::wrap_line;
use crate::models::{AnalysisKind, SearchResult};
use crate::tui::app::{App, Focus, TaskStage, View};
use crate::tui::theme::{Icons, Theme};
use crate::tui::widgets;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};

/// Screen areas for one frame
#[derive(Debug, Clone, Copy)]
pub struct Regions {
    pub header: Rect,
    pub tabs: Rect,
    pub progress: Rect,
    /// Path input, only on the file analysis tab
    pub files: Option<Rect>,
    pub report: Rect,
    pub history: Rect,
    pub notices: Rect,
    pub status: Rect,
}

pub fn regions(area: Rect, tab: AnalysisKind) -> Regions {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // Header
            Constraint::Length(3),  // Tabs
            Constraint::Length(4),  // Progress
            Constraint::Min(10),    // Report + history
            Constraint::Length(5),  // Notices
            Constraint::Length(1),  // Status bar
        ])
        .split(area);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(chunks[3]);

    let (files, report) = if tab == AnalysisKind::FileAnalysis {
        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(6), Constraint::Min(5)])
            .split(body[0]);
        (Some(left[0]), left[1])
    } else {
        (None, body[0])
    };

    Regions {
        header: chunks[0],
        tabs: chunks[1],
        progress: chunks[2],
        files,
        report,
        history: body[1],
        notices: chunks[4],
        status: chunks[5],
    }
}

/// Report line count and visible height for the current frame size
pub fn report_extent(area: Rect, app: &App) -> (u16, u16) {
    let report = regions(area, app.tab).report;
    let width = report.width.saturating_sub(2);
    let height = report.height.saturating_sub(2);
    let lines = report_lines(app, width as usize).len();
    (u16::try_from(lines).unwrap_or(u16::MAX), height)
}

/// Render the main UI
pub fn render(frame: &mut Frame, app: &App) {
    let regions = regions(frame.area(), app.tab);

    render_header(frame, regions.header, app);
    render_tabs(frame, regions.tabs, app);
    widgets::render_progress(frame, regions.progress, &app.stage, app.tab);
    if let Some(files) = regions.files {
        render_file_input(frame, files, app);
    }
    render_report(frame, regions.report, app);
    widgets::render_history(frame, regions.history, app);
    render_notices(frame, regions.notices, app);
    render_status_bar(frame, regions.status, app);

    match app.view {
        View::Settings => widgets::render_settings(frame, app),
        View::Help => render_help(frame),
        View::Dashboard => {}
    }
}

/// Render the header with API status indicators
fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let green_dot = Style::default().fg(Color::Green);
    let red_dot = Style::default().fg(Color::Red);
    let dot = |ready: bool| Span::styled("●", if ready { green_dot } else { red_dot });

    let title_text = vec![Line::from(vec![
        Span::raw("🤖 "),
        Span::styled("Robot Insight", Theme::title()),
        Span::styled(" Industry Dashboard", Theme::text_secondary()),
        Span::raw("  "),
        dot(app.has_credential()),
        Span::styled(" Gemini ", Theme::text_dim()),
        dot(app.search_ready()),
        Span::styled(" Search", Theme::text_dim()),
    ])];

    let title = Paragraph::new(title_text).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::border()),
    );

    frame.render_widget(title, area);
}

fn render_tabs(frame: &mut Frame, area: Rect, app: &App) {
    let titles: Vec<Line> = AnalysisKind::ALL
        .iter()
        .map(|&kind| {
            let mark = if app.session.report(kind).is_some() {
                format!(" {}", Icons::COMPLETE)
            } else {
                String::new()
            };
            Line::from(format!(" {}{} ", kind.title(), mark))
        })
        .collect();
    let selected = AnalysisKind::ALL
        .iter()
        .position(|&k| k == app.tab)
        .unwrap_or(0);

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(Theme::text_secondary())
        .highlight_style(Theme::selected())
        .divider("│")
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::border()),
        );

    frame.render_widget(tabs, area);
}

fn render_file_input(frame: &mut Frame, area: Rect, app: &App) {
    let focused = app.view == View::Dashboard && app.focus == Focus::Report;
    let block = Block::default()
        .title(" Files (PDF / TXT paths) ")
        .borders(Borders::ALL)
        .border_style(if focused {
            Theme::border_focused()
        } else {
            Theme::border()
        });

    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(&app.file_input, inner);
}

fn render_report(frame: &mut Frame, area: Rect, app: &App) {
    let focused = app.view == View::Dashboard
        && app.focus == Focus::Report
        && app.tab != AnalysisKind::FileAnalysis;
    let title = match app.active_report() {
        Some(_) if app.max_scroll > 0 => format!(
            " {} Report [{}/{}] ",
            app.tab.title(),
            app.scroll_offset,
            app.max_scroll
        ),
        _ => format!(" {} Report ", app.tab.title()),
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(if focused {
            Theme::border_focused()
        } else {
            Theme::border()
        });

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines = report_lines(app, inner.width as usize);
    let paragraph = Paragraph::new(lines).scroll((app.scroll_offset, 0));
    frame.render_widget(paragraph, inner);
}

/// Body of the report panel, already wrapped to `width` cells
pub fn report_lines(app: &App, width: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    let Some(report) = app.active_report() else {
        return placeholder_lines(app);
    };

    for line in report.lines() {
        let style = if line.trim_start().starts_with('#') {
            Theme::report_heading()
        } else {
            Theme::text()
        };
        push_wrapped(&mut lines, line, width, style);
    }

    if app.tab == AnalysisKind::WeeklyNews {
        if let Some(news) = &app.session.news {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!("Sources ({})", news.total()),
                Theme::heading(),
            )));
            push_sources(&mut lines, "Construction / humanoid", &news.primary, width);
            push_sources(&mut lines, "Other robots", &news.secondary, width);
        }
    }

    lines
}

fn push_sources(lines: &mut Vec<Line<'static>>, label: &str, items: &[SearchResult], width: usize) {
    if items.is_empty() {
        return;
    }
    lines.push(Line::from(Span::styled(
        format!("{} ({})", label, items.len()),
        Theme::text_secondary(),
    )));
    for item in items {
        push_wrapped(lines, &format!("{} {}", Icons::DOT, item.title), width, Theme::text());
        push_wrapped(lines, &format!("  {}", item.url), width, Theme::text_dim());
    }
}

fn placeholder_lines(app: &App) -> Vec<Line<'static>> {
    let hint = |text: &str| Line::from(Span::styled(text.to_string(), Theme::text_secondary()));
    let check = |done: bool, text: &str| {
        let (icon, style) = if done {
            (Icons::CHECKED, Theme::success())
        } else {
            (Icons::UNCHECKED, Theme::text_dim())
        };
        Line::from(Span::styled(format!("{} {}", icon, text), style))
    };

    match app.tab {
        AnalysisKind::WeeklyNews => {
            let keywords = &app.dashboard.config.keywords;
            vec![
                hint("Press Enter or Ctrl+R to search this week's robot news and write the report."),
                Line::from(""),
                hint(&format!(
                    "Priority keywords: {}   Other keywords: {}",
                    keywords.primary().len(),
                    keywords.secondary().len()
                )),
                hint(&format!(
                    "History context: {} (Ctrl+U)",
                    if app.session.use_history { "on" } else { "off" }
                )),
            ]
        }
        AnalysisKind::FileAnalysis => vec![
            hint("Type PDF or text file paths above, one per line, then press Ctrl+R."),
        ],
        AnalysisKind::Integrated => vec![
            hint("Combines the two reports below. Press Enter or Ctrl+R when both exist."),
            Line::from(""),
            check(
                app.session.report(AnalysisKind::WeeklyNews).is_some(),
                "Weekly news report",
            ),
            check(
                app.session.report(AnalysisKind::FileAnalysis).is_some(),
                "File analysis report",
            ),
        ],
    }
}

/// Terminal cells taken by `c`
fn cell_width(c: char) -> f32 {
    let mut buf = [0u8; 4];
    Span::raw(&*c.encode_utf8(&mut buf)).width() as f32
}

fn push_wrapped(lines: &mut Vec<Line<'static>>, text: &str, width: usize, style: Style) {
    let text = text.replace('\t', "    ");
    match wrap_line(&text, width as f32, &cell_width) {
        Ok(rows) => lines.extend(rows.into_iter().map(|row| Line::from(Span::styled(row, style)))),
        // Too narrow to wrap; let the terminal clip it
        Err(_) => lines.push(Line::from(Span::styled(text, style))),
    }
}

fn render_notices(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .title(" Notices ")
        .borders(Borders::ALL)
        .border_style(Theme::border());

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let visible = inner.height as usize;
    let width = inner.width as usize;
    let start = app.notices.len().saturating_sub(visible);
    let lines: Vec<Line> = app.notices[start..]
        .iter()
        .map(|notice| {
            Line::from(vec![
                Span::styled(
                    format!("{} ", notice.timestamp.format("%H:%M:%S")),
                    Theme::text_dim(),
                ),
                Span::styled(
                    widgets::truncate_string(&notice.text, width.saturating_sub(9)),
                    Theme::notice(notice.level),
                ),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

/// Render the status bar
fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let status = match &app.stage {
        TaskStage::Idle => Span::styled("Ready", Theme::text_secondary()),
        TaskStage::Searching { index, total, .. } => Span::styled(
            format!("Searching news ({}/{})", (index + 1).min(*total), total),
            Theme::active(),
        ),
        TaskStage::Reading => Span::styled("Reading files...", Theme::active()),
        TaskStage::Generating(_) => Span::styled("Generating report...", Theme::active()),
        TaskStage::Exporting(_) => Span::styled("Exporting...", Theme::active()),
        TaskStage::Complete(_) => Span::styled("Complete", Theme::complete()),
        TaskStage::Error(_) => Span::styled("Error", Theme::error()),
    };

    let shortcuts: Vec<(&str, &str)> = if app.focus == Focus::History {
        vec![
            ("[Space]", " Select "),
            ("[Del]", " Delete "),
            ("[F2]", " Back "),
            ("[Ctrl+U]", " Use history "),
        ]
    } else {
        vec![
            ("[Ctrl+R]", " Run "),
            ("[Tab]", " Switch tab "),
            ("[Ctrl+D/P]", " DOCX/PDF "),
            ("[F2]", " History "),
            ("[Ctrl+S]", " Settings "),
            ("[F1]", " Help"),
        ]
    };

    let line = Line::from(
        std::iter::once(status)
            .chain(std::iter::once(Span::raw(" │ ")))
            .chain(shortcuts.into_iter().flat_map(|(key, desc)| {
                [
                    Span::styled(key, Theme::shortcut_key()),
                    Span::styled(desc, Theme::shortcut_desc()),
                ]
            }))
            .collect::<Vec<_>>(),
    );

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the help modal
fn render_help(frame: &mut Frame) {
    let area = centered_rect(60, 70, frame.area());
    frame.render_widget(Clear, area);

    let entry = |key: &'static str, desc: &'static str| {
        Line::from(vec![
            Span::styled(format!("{:<13}", key), Theme::shortcut_key()),
            Span::styled(desc, Theme::text()),
        ])
    };

    let help_lines = vec![
        Line::from(Span::styled("Keyboard Shortcuts", Theme::heading())),
        Line::from(""),
        entry("Enter/Ctrl+R", "Run the analysis of the active tab"),
        entry("Tab/Shift+Tab", "Switch tab (next field in settings)"),
        entry("Ctrl+D", "Export the report as Word (.docx)"),
        entry("Ctrl+P", "Export the report as PDF"),
        entry("F2", "Focus the history panel"),
        entry("Space/Enter", "Tick or untick a history entry"),
        entry("Del", "Delete the history entry"),
        entry("Ctrl+U", "Feed history into the weekly report"),
        entry("↑/↓", "Scroll report / move in history"),
        entry("PageUp/Down", "Scroll page"),
        entry("Ctrl+S", "Open settings"),
        entry("Ctrl+Q", "Quit application"),
        entry("Ctrl+C", "Force quit"),
        entry("Esc", "Close modal / Cancel"),
        entry("F1", "Show this help"),
        Line::from(""),
        Line::from(Span::styled("Press Esc or F1 to close", Theme::text_dim())),
    ];

    let paragraph = Paragraph::new(help_lines).block(
        Block::default()
            .title(" Help ")
            .borders(Borders::ALL)
            .border_style(Theme::border_focused()),
    );

    frame.render_widget(paragraph, area);
}

/// Helper to create a centered rect
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
