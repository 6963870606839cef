//! Terminal User Interface Module
//!
//! The interactive dashboard: one tab per analysis, a history panel with
//! selection checkboxes, and export shortcuts. Built with Ratatui.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  🤖 Robot Insight Industry Dashboard      ● Gemini ● Search     │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  Weekly News ✓ │ File Analysis │ Integrated                     │
//! │  ┌─ Progress ─────────────────────────────────────────────┐    │
//! │  │ ✓ Search → ● Generate → ○ Done                          │    │
//! │  └─────────────────────────────────────────────────────────┘    │
//! │  ┌─ Report ──────────────────────────┐ ┌─ History 3/10 ───┐    │
//! │  │  [Scrollable report + sources]    │ │ [x] 10-19 09:00  │    │
//! │  └───────────────────────────────────┘ └──────────────────┘    │
//! │  ┌─ Notices ───────────────────────────────────────────────┐    │
//! │  └─────────────────────────────────────────────────────────┘    │
//! │  Ready │ [Ctrl+R] Run [Tab] Switch tab [Ctrl+D/P] DOCX/PDF ...  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod app;
pub mod event;
pub mod theme;
pub mod ui;
pub mod widgets;

pub use app::{App, AppEvent, TaskStage, View};
pub use event::{AppAction, EventHandler};

use crate::session::Dashboard;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::{self, Stdout};
use tracing::{error, info};

/// Type alias for our terminal backend
pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Initialize the terminal for TUI mode
pub fn init_terminal() -> anyhow::Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to its original state
pub fn restore_terminal(terminal: &mut Tui) -> anyhow::Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

/// Run the TUI application
pub async fn run(dashboard: Dashboard) -> anyhow::Result<()> {
    info!("Starting TUI mode");

    let session = dashboard.open_session().await;
    let history = dashboard.history.load().await;

    let mut terminal = init_terminal()?;
    let mut app = App::new(dashboard, session, history);
    let mut events = EventHandler::new(std::time::Duration::from_millis(100));

    let result = run_app(&mut terminal, &mut app, &mut events).await;

    if let Err(e) = restore_terminal(&mut terminal) {
        error!("Failed to restore terminal: {}", e);
    }

    result
}

/// Main application loop
async fn run_app(
    terminal: &mut Tui,
    app: &mut App,
    events: &mut EventHandler,
) -> anyhow::Result<()> {
    loop {
        app.poll_events();

        terminal.draw(|frame| {
            let (content, viewport) = ui::report_extent(frame.area(), app);
            app.update_scroll_bounds(content, viewport);
            ui::render(frame, app);
        })?;

        if app.should_quit {
            break;
        }

        // Ticks arrive every 100ms, so background results still get drawn
        match events.next().await {
            Some(action) => app.handle_action(action).await,
            None => break,
        }
    }

    info!("TUI exited normally");
    Ok(())
}
