//! Theme and Styling
//!
//! Defines colors and styles for the dashboard.

use crate::tui::app::NoticeLevel;
use ratatui::style::{Color, Modifier, Style};

/// Application theme
pub struct Theme;

impl Theme {
    // === Primary Colors ===

    /// Primary accent color (steel blue)
    pub const ACCENT: Color = Color::Rgb(96, 165, 250);

    pub const SUCCESS: Color = Color::Rgb(34, 197, 94);

    pub const WARNING: Color = Color::Rgb(251, 191, 36);

    pub const ERROR: Color = Color::Rgb(239, 68, 68);

    // === Text Colors ===

    pub const TEXT_PRIMARY: Color = Color::Rgb(229, 229, 229);

    /// Muted text
    pub const TEXT_SECONDARY: Color = Color::Rgb(161, 161, 161);

    pub const TEXT_DIM: Color = Color::Rgb(82, 82, 82);

    // === Background Colors ===

    /// Highlighted/selected background
    pub const BG_HIGHLIGHT: Color = Color::Rgb(38, 38, 38);

    // === Border Colors ===

    pub const BORDER: Color = Color::Rgb(51, 51, 51);

    pub const BORDER_FOCUSED: Color = Color::Rgb(59, 130, 246);

    // === Styles ===

    /// Default text style
    pub fn text() -> Style {
        Style::default().fg(Self::TEXT_PRIMARY)
    }

    pub fn text_secondary() -> Style {
        Style::default().fg(Self::TEXT_SECONDARY)
    }

    pub fn text_dim() -> Style {
        Style::default().fg(Self::TEXT_DIM)
    }

    pub fn title() -> Style {
        Style::default()
            .fg(Self::ACCENT)
            .add_modifier(Modifier::BOLD)
    }

    pub fn heading() -> Style {
        Style::default()
            .fg(Self::TEXT_PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    /// Markdown-style `##` headings inside reports
    pub fn report_heading() -> Style {
        Style::default()
            .fg(Self::ACCENT)
            .add_modifier(Modifier::BOLD)
    }

    pub fn success() -> Style {
        Style::default().fg(Self::SUCCESS)
    }

    pub fn warning() -> Style {
        Style::default().fg(Self::WARNING)
    }

    pub fn error() -> Style {
        Style::default().fg(Self::ERROR)
    }

    pub fn border() -> Style {
        Style::default().fg(Self::BORDER)
    }

    pub fn border_focused() -> Style {
        Style::default().fg(Self::BORDER_FOCUSED)
    }

    /// Selected item style
    pub fn selected() -> Style {
        Style::default()
            .fg(Self::ACCENT)
            .add_modifier(Modifier::BOLD)
    }

    /// Row under the cursor in a focused list
    pub fn cursor_row() -> Style {
        Style::default()
            .bg(Self::BG_HIGHLIGHT)
            .add_modifier(Modifier::BOLD)
    }

    pub fn shortcut_key() -> Style {
        Style::default()
            .fg(Self::ACCENT)
            .add_modifier(Modifier::BOLD)
    }

    pub fn shortcut_desc() -> Style {
        Style::default().fg(Self::TEXT_SECONDARY)
    }

    /// Active/in-progress indicator
    pub fn active() -> Style {
        Style::default()
            .fg(Self::WARNING)
            .add_modifier(Modifier::BOLD)
    }

    pub fn complete() -> Style {
        Style::default().fg(Self::SUCCESS)
    }

    pub fn pending() -> Style {
        Style::default().fg(Self::TEXT_DIM)
    }

    /// Badge for labels like "Configured"
    pub fn badge_success() -> Style {
        Style::default()
            .fg(Color::Black)
            .bg(Self::SUCCESS)
            .add_modifier(Modifier::BOLD)
    }

    pub fn notice(level: NoticeLevel) -> Style {
        match level {
            NoticeLevel::Info => Self::text_secondary(),
            NoticeLevel::Success => Self::success(),
            NoticeLevel::Warning => Self::warning(),
            NoticeLevel::Error => Self::error(),
        }
    }
}

/// Progress stage icons
pub struct Icons;

impl Icons {
    pub const COMPLETE: &'static str = "✓";
    pub const ACTIVE: &'static str = "●";
    pub const PENDING: &'static str = "○";
    pub const ERROR: &'static str = "✗";
    pub const ARROW: &'static str = "→";
    pub const CURSOR: &'static str = "▌";
    pub const SELECTED: &'static str = "▶";
    pub const DOT: &'static str = "•";
    pub const CHECKED: &'static str = "[x]";
    pub const UNCHECKED: &'static str = "[ ]";
}
