//! Event Handling
//!
//! Handles keyboard and timer events for the TUI.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use futures::{FutureExt, StreamExt};
use std::time::Duration;
use tokio::sync::mpsc;

/// Actions that can be performed in the application
#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    /// Quit the application (refused while a task runs)
    Quit,
    /// Force quit without confirmation
    ForceQuit,
    /// Enter key
    Submit,
    /// Run the analysis of the active tab
    Run,
    ExportDocx,
    ExportPdf,
    /// Switch history context on or off for the weekly report
    ToggleUseHistory,
    /// Move focus between the report and the history panel
    ToggleHistoryFocus,
    /// Delete the history entry under the cursor
    DeleteHistory,
    /// Toggle settings view
    ToggleSettings,
    /// Toggle help view
    ToggleHelp,
    /// Escape - close modals, cancel
    Escape,
    ScrollUp,
    ScrollDown,
    ScrollPageUp,
    ScrollPageDown,
    /// Next tab or field (Tab)
    NextField,
    /// Previous tab or field (Shift+Tab)
    PrevField,
    /// Regular input character
    Input(KeyEvent),
    /// Timer tick for animations
    Tick,
}

/// Event handler for the TUI
pub struct EventHandler {
    rx: mpsc::Receiver<AppAction>,
    _tx: mpsc::Sender<AppAction>,
}

impl EventHandler {
    /// Create a new event handler with specified tick rate
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::channel(100);
        let tx_clone = tx.clone();

        // Spawn event polling task
        tokio::spawn(async move {
            let mut reader = crossterm::event::EventStream::new();
            let mut tick_interval = tokio::time::interval(tick_rate);

            loop {
                let tick = tick_interval.tick();
                let crossterm_event = reader.next().fuse();

                tokio::select! {
                    _ = tick => {
                        if tx_clone.send(AppAction::Tick).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(evt)) = crossterm_event => {
                        if let Some(action) = Self::map_event(evt) {
                            if tx_clone.send(action).await.is_err() {
                                break;
                            }
                        }
                    }
                }
            }
        });

        Self { rx, _tx: tx }
    }

    /// Wait for the next action
    pub async fn next(&mut self) -> Option<AppAction> {
        self.rx.recv().await
    }

    fn map_event(event: Event) -> Option<AppAction> {
        match event {
            Event::Key(key) => Self::map_key_event(key),
            _ => None,
        }
    }

    /// Map a key event to an app action
    pub fn map_key_event(key: KeyEvent) -> Option<AppAction> {
        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('c')) => Some(AppAction::ForceQuit),
            (KeyModifiers::CONTROL, KeyCode::Char('q')) => Some(AppAction::Quit),
            (KeyModifiers::CONTROL, KeyCode::Char('s')) => Some(AppAction::ToggleSettings),
            (KeyModifiers::CONTROL, KeyCode::Char('r')) => Some(AppAction::Run),
            (KeyModifiers::CONTROL, KeyCode::Char('d')) => Some(AppAction::ExportDocx),
            (KeyModifiers::CONTROL, KeyCode::Char('p')) => Some(AppAction::ExportPdf),
            (KeyModifiers::CONTROL, KeyCode::Char('u')) => Some(AppAction::ToggleUseHistory),

            (KeyModifiers::SHIFT, KeyCode::BackTab) => Some(AppAction::PrevField),

            (KeyModifiers::NONE, code) | (KeyModifiers::SHIFT, code) => match code {
                KeyCode::Esc => Some(AppAction::Escape),
                KeyCode::Enter => Some(AppAction::Submit),
                KeyCode::F(1) => Some(AppAction::ToggleHelp),
                KeyCode::F(2) => Some(AppAction::ToggleHistoryFocus),
                KeyCode::Delete => Some(AppAction::DeleteHistory),

                KeyCode::Up => Some(AppAction::ScrollUp),
                KeyCode::Down => Some(AppAction::ScrollDown),
                KeyCode::PageUp => Some(AppAction::ScrollPageUp),
                KeyCode::PageDown => Some(AppAction::ScrollPageDown),

                KeyCode::Tab => Some(AppAction::NextField),

                _ => Some(AppAction::Input(key)),
            },

            // Pass through other key combinations as input
            _ => Some(AppAction::Input(key)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(modifiers: KeyModifiers, code: KeyCode) -> Option<AppAction> {
        EventHandler::map_key_event(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn test_control_shortcuts() {
        assert_eq!(key(KeyModifiers::CONTROL, KeyCode::Char('r')), Some(AppAction::Run));
        assert_eq!(key(KeyModifiers::CONTROL, KeyCode::Char('d')), Some(AppAction::ExportDocx));
        assert_eq!(key(KeyModifiers::CONTROL, KeyCode::Char('p')), Some(AppAction::ExportPdf));
        assert_eq!(key(KeyModifiers::CONTROL, KeyCode::Char('c')), Some(AppAction::ForceQuit));
    }

    #[test]
    fn test_plain_keys() {
        assert_eq!(key(KeyModifiers::NONE, KeyCode::Tab), Some(AppAction::NextField));
        assert_eq!(key(KeyModifiers::SHIFT, KeyCode::BackTab), Some(AppAction::PrevField));
        assert_eq!(key(KeyModifiers::NONE, KeyCode::F(2)), Some(AppAction::ToggleHistoryFocus));
        assert!(matches!(
            key(KeyModifiers::SHIFT, KeyCode::Char('A')),
            Some(AppAction::Input(_))
        ));
    }
}
