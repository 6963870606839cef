//! Application State
//!
//! Contains the dashboard state and the logic behind every key binding.

use crate::config::parse_keyword_list;
use crate::export::{ExportFormat, ExportedFile};
use crate::models::{AnalysisKind, HistoryEntry};
use crate::report::ReportOutcome;
use crate::session::{Dashboard, FileOutcome, Session, WeeklyOutcome, WeeklyProgress};
use crate::storage::key_hint;
use crate::tui::event::AppAction;
use chrono::{DateTime, Local};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tui_textarea::TextArea;

/// Stage of the running background task
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TaskStage {
    /// Idle, waiting for input
    #[default]
    Idle,
    /// Searching news, one keyword at a time
    Searching {
        index: usize,
        total: usize,
        keyword: String,
    },
    /// Reading uploaded files
    Reading,
    /// Waiting for the model
    Generating(AnalysisKind),
    /// Writing a document
    Exporting(ExportFormat),
    /// Finished, with a short summary
    Complete(String),
    /// Error occurred
    Error(String),
}

/// Current view/screen
#[derive(Debug, Clone, PartialEq, Default)]
pub enum View {
    #[default]
    Dashboard,
    Settings,
    Help,
}

/// Which panel receives arrows and Enter
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Focus {
    #[default]
    Report,
    History,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A line in the notices panel
#[derive(Debug, Clone)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
    pub timestamp: DateTime<Local>,
}

/// Events from background tasks
#[derive(Debug)]
pub enum AppEvent {
    StageChanged(TaskStage),
    WeeklyDone(Box<WeeklyOutcome>),
    FilesDone(Box<FileOutcome>),
    IntegratedDone(ReportOutcome),
    Exported(ExportedFile),
    /// Fresh copy of the history list
    HistoryLoaded(Vec<HistoryEntry>),
    Error(String),
}

/// Fields of the settings view, in Tab order
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SettingsField {
    ApiKey,
    Construction,
    Humanoid,
    Other,
}

impl SettingsField {
    pub const ALL: [SettingsField; 4] = [
        SettingsField::ApiKey,
        SettingsField::Construction,
        SettingsField::Humanoid,
        SettingsField::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SettingsField::ApiKey => "Gemini API Key",
            SettingsField::Construction => "Construction Robot Keywords",
            SettingsField::Humanoid => "Humanoid Robot Keywords",
            SettingsField::Other => "Other Robot Keywords",
        }
    }

    /// Slot in [`App::keyword_inputs`]
    fn keyword_slot(self) -> Option<usize> {
        match self {
            SettingsField::ApiKey => None,
            SettingsField::Construction => Some(0),
            SettingsField::Humanoid => Some(1),
            SettingsField::Other => Some(2),
        }
    }
}

/// Main application state
pub struct App {
    pub dashboard: Dashboard,
    pub session: Session,

    // UI State
    pub view: View,
    pub tab: AnalysisKind,
    pub focus: Focus,
    pub should_quit: bool,

    // Report State
    pub file_input: TextArea<'static>,
    pub scroll_offset: u16,
    pub max_scroll: u16,
    pub notices: Vec<Notice>,

    // History State
    pub history: Vec<HistoryEntry>,
    pub history_cursor: usize,

    // Task State
    pub stage: TaskStage,
    pub busy: bool,

    // Settings State
    pub settings_field_index: usize,
    pub settings_input: String,
    pub settings_show_input: bool,
    pub keyword_inputs: [TextArea<'static>; 3],

    // Async communication
    event_rx: mpsc::Receiver<AppEvent>,
    event_tx: mpsc::Sender<AppEvent>,
}

const MAX_NOTICES: usize = 50;

impl App {
    /// Create the application around an opened session and the current history
    pub fn new(dashboard: Dashboard, session: Session, history: Vec<HistoryEntry>) -> Self {
        let mut file_input = TextArea::default();
        file_input.set_cursor_line_style(ratatui::style::Style::default());
        file_input.set_placeholder_text("One PDF or text file path per line...");

        let keywords = &dashboard.config.keywords;
        let keyword_inputs = [
            keyword_area(&keywords.construction),
            keyword_area(&keywords.humanoid),
            keyword_area(&keywords.other),
        ];

        let (tx, rx) = mpsc::channel(100);

        let mut app = Self {
            dashboard,
            session,
            view: View::Dashboard,
            tab: AnalysisKind::WeeklyNews,
            focus: Focus::Report,
            should_quit: false,
            file_input,
            scroll_offset: 0,
            max_scroll: 0,
            notices: Vec::new(),
            history,
            history_cursor: 0,
            stage: TaskStage::Idle,
            busy: false,
            settings_field_index: 0,
            settings_input: String::new(),
            settings_show_input: false,
            keyword_inputs,
            event_rx: rx,
            event_tx: tx,
        };

        // Every stored analysis starts ticked
        app.session.select_all_history(app.history.len());

        if app.session.credential.is_empty() {
            app.notify(
                NoticeLevel::Warning,
                "No Gemini API key configured. Press Ctrl+S to add one.",
            );
        }
        if !app.search_ready() {
            app.notify(
                NoticeLevel::Warning,
                "SERPAPI_API_KEY is not set; news search will return nothing.",
            );
        }
        app
    }

    pub fn has_credential(&self) -> bool {
        !self.session.credential.trim().is_empty()
    }

    pub fn search_ready(&self) -> bool {
        !self.dashboard.config.search.serpapi_key.trim().is_empty()
    }

    pub fn credential_hint(&self) -> Option<String> {
        key_hint(&self.session.credential)
    }

    pub fn settings_field(&self) -> SettingsField {
        SettingsField::ALL[self.settings_field_index % SettingsField::ALL.len()]
    }

    /// Report shown in the active tab
    pub fn active_report(&self) -> Option<&str> {
        self.session.report(self.tab)
    }

    pub fn notify(&mut self, level: NoticeLevel, text: impl Into<String>) {
        self.notices.push(Notice {
            level,
            text: text.into(),
            timestamp: Local::now(),
        });
        if self.notices.len() > MAX_NOTICES {
            let excess = self.notices.len() - MAX_NOTICES;
            self.notices.drain(..excess);
        }
    }

    /// Poll for async events
    pub fn poll_events(&mut self) {
        let mut events = Vec::new();
        while let Ok(event) = self.event_rx.try_recv() {
            events.push(event);
        }
        for event in events {
            self.handle_event(event);
        }
    }

    /// Handle an async event
    fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::StageChanged(stage) => {
                self.stage = stage;
            }
            AppEvent::WeeklyDone(outcome) => {
                let WeeklyOutcome {
                    batch,
                    report,
                    search_warnings,
                } = *outcome;
                for warning in search_warnings {
                    self.notify(NoticeLevel::Warning, warning);
                }
                let articles = batch.total();
                self.session.news = Some(batch);
                self.finish_report(
                    AnalysisKind::WeeklyNews,
                    report,
                    format!("Weekly report ready ({} articles)", articles),
                );
            }
            AppEvent::FilesDone(outcome) => {
                let FileOutcome {
                    report,
                    used_files,
                    file_warnings,
                } = *outcome;
                for warning in file_warnings {
                    self.notify(NoticeLevel::Warning, warning);
                }
                self.finish_report(
                    AnalysisKind::FileAnalysis,
                    report,
                    format!("File report ready ({} files)", used_files.len()),
                );
            }
            AppEvent::IntegratedDone(report) => {
                self.finish_report(
                    AnalysisKind::Integrated,
                    report,
                    "Integrated report ready".to_string(),
                );
            }
            AppEvent::Exported(file) => {
                if let Some(warning) = file.warning {
                    self.notify(NoticeLevel::Warning, warning);
                }
                let summary = format!("Saved {}", file.path.display());
                self.notify(NoticeLevel::Success, summary.clone());
                self.stage = TaskStage::Complete(summary);
                self.busy = false;
            }
            AppEvent::HistoryLoaded(entries) => {
                self.session.reconcile_history(&self.history, &entries);
                self.history = entries;
                self.history_cursor = self.history_cursor.min(self.history.len().saturating_sub(1));
            }
            AppEvent::Error(message) => {
                self.notify(NoticeLevel::Error, message.clone());
                self.stage = TaskStage::Error(message);
                self.busy = false;
            }
        }
    }

    fn finish_report(&mut self, kind: AnalysisKind, report: ReportOutcome, summary: String) {
        for warning in report.warnings {
            self.notify(NoticeLevel::Warning, warning);
        }
        self.session.set_report(kind, report.text);
        self.notify(NoticeLevel::Success, summary.clone());
        self.stage = TaskStage::Complete(summary);
        self.busy = false;
        if self.tab == kind {
            self.scroll_offset = 0;
        }
    }

    /// Handle a user action
    pub async fn handle_action(&mut self, action: AppAction) {
        match action {
            AppAction::Quit => {
                if self.busy {
                    self.notify(
                        NoticeLevel::Warning,
                        "A task is still running. Press Ctrl+C to quit anyway.",
                    );
                } else {
                    self.should_quit = true;
                }
            }
            AppAction::ForceQuit => {
                self.should_quit = true;
            }
            AppAction::Submit => match self.view {
                View::Settings => self.save_current_setting().await,
                View::Help => self.view = View::Dashboard,
                View::Dashboard => {
                    if self.focus == Focus::History {
                        self.toggle_history_at_cursor();
                    } else if self.tab == AnalysisKind::FileAnalysis {
                        self.file_input.insert_newline();
                    } else {
                        self.start_task();
                    }
                }
            },
            AppAction::Run => {
                if self.view == View::Dashboard {
                    self.start_task();
                }
            }
            AppAction::ExportDocx => self.start_export(ExportFormat::Docx),
            AppAction::ExportPdf => self.start_export(ExportFormat::Pdf),
            AppAction::ToggleUseHistory => {
                self.session.use_history = !self.session.use_history;
                let state = if self.session.use_history { "on" } else { "off" };
                self.notify(
                    NoticeLevel::Info,
                    format!("History context for weekly reports: {}", state),
                );
            }
            AppAction::ToggleHistoryFocus => {
                if self.view == View::Dashboard {
                    self.focus = match self.focus {
                        Focus::Report => Focus::History,
                        Focus::History => Focus::Report,
                    };
                }
            }
            AppAction::DeleteHistory => {
                if self.view == View::Dashboard && self.focus == Focus::History {
                    self.delete_history_at_cursor().await;
                }
            }
            AppAction::ToggleSettings => {
                if self.view == View::Settings {
                    self.close_settings();
                } else {
                    self.view = View::Settings;
                }
            }
            AppAction::ToggleHelp => {
                self.view = if self.view == View::Help {
                    View::Dashboard
                } else {
                    View::Help
                };
            }
            AppAction::Escape => match self.view {
                View::Settings if self.settings_show_input => {
                    self.settings_show_input = false;
                    self.settings_input.clear();
                }
                View::Settings => self.close_settings(),
                View::Help => self.view = View::Dashboard,
                View::Dashboard => self.focus = Focus::Report,
            },
            AppAction::ScrollUp => {
                if self.focus == Focus::History && self.view == View::Dashboard {
                    self.history_cursor = self.history_cursor.saturating_sub(1);
                } else {
                    self.scroll_offset = self.scroll_offset.saturating_sub(1);
                }
            }
            AppAction::ScrollDown => {
                if self.focus == Focus::History && self.view == View::Dashboard {
                    if self.history_cursor + 1 < self.history.len() {
                        self.history_cursor += 1;
                    }
                } else if self.scroll_offset < self.max_scroll {
                    self.scroll_offset += 1;
                }
            }
            AppAction::ScrollPageUp => {
                self.scroll_offset = self.scroll_offset.saturating_sub(10);
            }
            AppAction::ScrollPageDown => {
                self.scroll_offset = (self.scroll_offset + 10).min(self.max_scroll);
            }
            AppAction::NextField => {
                if self.view == View::Settings {
                    self.settings_field_index =
                        (self.settings_field_index + 1) % SettingsField::ALL.len();
                    self.settings_show_input = false;
                    self.settings_input.clear();
                } else {
                    self.switch_tab(1);
                }
            }
            AppAction::PrevField => {
                if self.view == View::Settings {
                    self.settings_field_index = if self.settings_field_index == 0 {
                        SettingsField::ALL.len() - 1
                    } else {
                        self.settings_field_index - 1
                    };
                    self.settings_show_input = false;
                    self.settings_input.clear();
                } else {
                    self.switch_tab(AnalysisKind::ALL.len() - 1);
                }
            }
            AppAction::Input(key_event) => {
                self.handle_input(key_event);
            }
            AppAction::Tick => {}
        }
    }

    fn switch_tab(&mut self, step: usize) {
        let current = AnalysisKind::ALL
            .iter()
            .position(|&k| k == self.tab)
            .unwrap_or(0);
        self.tab = AnalysisKind::ALL[(current + step) % AnalysisKind::ALL.len()];
        self.scroll_offset = 0;
        self.focus = Focus::Report;
    }

    /// Handle keyboard input
    fn handle_input(&mut self, key: crossterm::event::KeyEvent) {
        use crossterm::event::{KeyCode, KeyModifiers};

        match self.view {
            View::Settings => match self.settings_field().keyword_slot() {
                Some(slot) => {
                    self.keyword_inputs[slot].input(key);
                }
                None if self.settings_show_input => match key.code {
                    KeyCode::Char(c) => self.settings_input.push(c),
                    KeyCode::Backspace => {
                        self.settings_input.pop();
                    }
                    _ => {}
                },
                None => {
                    if key.modifiers == KeyModifiers::NONE && key.code == KeyCode::Char('e') {
                        self.settings_show_input = true;
                    }
                }
            },
            View::Dashboard => {
                if self.focus == Focus::History {
                    if key.code == KeyCode::Char(' ') {
                        self.toggle_history_at_cursor();
                    }
                } else if self.tab == AnalysisKind::FileAnalysis {
                    self.file_input.input(key);
                }
            }
            View::Help => {}
        }
    }

    /// Paths typed into the file input, one per line
    pub fn file_paths(&self) -> Vec<PathBuf> {
        self.file_input
            .lines()
            .iter()
            .map(|line| line.trim().trim_matches('"'))
            .filter(|line| !line.is_empty())
            .map(PathBuf::from)
            .collect()
    }

    fn toggle_history_at_cursor(&mut self) {
        if self.history_cursor < self.history.len() {
            self.session
                .toggle_history(self.history_cursor, self.history.len());
        }
    }

    async fn delete_history_at_cursor(&mut self) {
        if self.busy {
            self.notify(NoticeLevel::Warning, "Wait for the running task to finish.");
            return;
        }
        if self.history_cursor >= self.history.len() {
            return;
        }

        let index = self.history_cursor;
        if self.dashboard.history.delete(index).await {
            let entries = self.dashboard.history.load().await;
            self.handle_event(AppEvent::HistoryLoaded(entries));
            self.notify(NoticeLevel::Info, format!("Deleted history entry {}", index + 1));
        } else {
            self.notify(NoticeLevel::Error, "Could not delete the history entry.");
        }
    }

    /// Start the analysis of the active tab in the background
    fn start_task(&mut self) {
        if self.busy {
            self.notify(NoticeLevel::Warning, "A task is already running.");
            return;
        }
        if !self.has_credential() {
            self.notify(
                NoticeLevel::Error,
                "Enter a Gemini API key first (Ctrl+S).",
            );
            return;
        }

        let tx = self.event_tx.clone();
        let dashboard = self.dashboard.clone();

        match self.tab {
            AnalysisKind::WeeklyNews => {
                let credential = self.session.credential.clone();
                let history = self.session.history_context();
                self.begin(TaskStage::Searching {
                    index: 0,
                    total: dashboard.config.keywords.primary().len()
                        + dashboard.config.keywords.secondary().len(),
                    keyword: String::new(),
                });

                tokio::spawn(async move {
                    let progress_tx = tx.clone();
                    let result = dashboard
                        .weekly_news(&credential, history, move |progress| {
                            let stage = match progress {
                                WeeklyProgress::Searching {
                                    index,
                                    total,
                                    keyword,
                                } => TaskStage::Searching {
                                    index,
                                    total,
                                    keyword: keyword.to_string(),
                                },
                                WeeklyProgress::Generating { .. } => {
                                    TaskStage::Generating(AnalysisKind::WeeklyNews)
                                }
                            };
                            progress_tx.try_send(AppEvent::StageChanged(stage)).ok();
                        })
                        .await;
                    let event = match result {
                        Ok(outcome) => AppEvent::WeeklyDone(Box::new(outcome)),
                        Err(e) => AppEvent::Error(e.to_string()),
                    };
                    Self::finish_task(&dashboard, &tx, event).await;
                });
            }
            AnalysisKind::FileAnalysis => {
                let paths = self.file_paths();
                if paths.is_empty() {
                    self.notify(NoticeLevel::Error, "Add at least one file path to analyze.");
                    return;
                }
                let credential = self.session.credential.clone();
                self.begin(TaskStage::Reading);

                tokio::spawn(async move {
                    tx.send(AppEvent::StageChanged(TaskStage::Generating(
                        AnalysisKind::FileAnalysis,
                    )))
                    .await
                    .ok();
                    let event = match dashboard.analyze_files(&paths, &credential).await {
                        Ok(outcome) => AppEvent::FilesDone(Box::new(outcome)),
                        Err(e) => AppEvent::Error(e.to_string()),
                    };
                    Self::finish_task(&dashboard, &tx, event).await;
                });
            }
            AnalysisKind::Integrated => {
                if self.session.integration_inputs().is_none() {
                    self.notify(
                        NoticeLevel::Error,
                        "Run the weekly news analysis and the file analysis first.",
                    );
                    return;
                }
                let session = self.session.clone();
                self.begin(TaskStage::Generating(AnalysisKind::Integrated));

                tokio::spawn(async move {
                    let event = match dashboard.integrated(&session).await {
                        Ok(report) => AppEvent::IntegratedDone(report),
                        Err(e) => AppEvent::Error(e.to_string()),
                    };
                    Self::finish_task(&dashboard, &tx, event).await;
                });
            }
        }
    }

    fn begin(&mut self, stage: TaskStage) {
        info!(kind = %self.tab, "Starting analysis");
        self.busy = true;
        self.stage = stage;
    }

    /// Send the result, then the history it may have changed
    async fn finish_task(dashboard: &Dashboard, tx: &mpsc::Sender<AppEvent>, event: AppEvent) {
        if let AppEvent::Error(message) = &event {
            error!(error = %message, "Analysis failed");
        }
        let entries = dashboard.history.load().await;
        tx.send(AppEvent::HistoryLoaded(entries)).await.ok();
        tx.send(event).await.ok();
    }

    /// Export the active tab's report in the background
    fn start_export(&mut self, format: ExportFormat) {
        if self.view != View::Dashboard {
            return;
        }
        if self.busy {
            self.notify(NoticeLevel::Warning, "A task is already running.");
            return;
        }
        let Some(text) = self.active_report().map(str::to_string) else {
            self.notify(NoticeLevel::Error, "No report to export in this tab yet.");
            return;
        };

        let kind = self.tab;
        let tx = self.event_tx.clone();
        let dashboard = self.dashboard.clone();
        self.busy = true;
        self.stage = TaskStage::Exporting(format);

        tokio::spawn(async move {
            let event = match dashboard.export(kind, format, &text).await {
                Ok(file) => AppEvent::Exported(file),
                Err(e) => {
                    error!(error = %e, "Export failed");
                    AppEvent::Error(e.to_string())
                }
            };
            tx.send(event).await.ok();
        });
    }

    /// Save the API key being edited
    async fn save_current_setting(&mut self) {
        if self.settings_field() != SettingsField::ApiKey {
            // Enter inside a keyword list starts a new keyword
            if let Some(slot) = self.settings_field().keyword_slot() {
                self.keyword_inputs[slot].insert_newline();
            }
            return;
        }
        if !self.settings_show_input || self.settings_input.trim().is_empty() {
            return;
        }

        let key = std::mem::take(&mut self.settings_input);
        match self
            .dashboard
            .update_credential(&mut self.session, &key)
            .await
        {
            Ok(()) => {
                info!("API key saved");
                self.notify(NoticeLevel::Success, "API key saved.");
            }
            Err(e) => {
                warn!(error = %e, "API key could not be persisted");
                self.notify(
                    NoticeLevel::Warning,
                    format!("API key applied for this session only: {}", e),
                );
            }
        }
        self.settings_show_input = false;
    }

    /// Leave settings, applying edited keyword lists
    fn close_settings(&mut self) {
        self.view = View::Dashboard;
        self.settings_show_input = false;
        self.settings_input.clear();

        let [construction, humanoid, other] =
            self.keyword_inputs.each_ref().map(|area| parse_keyword_list(&area.lines().join("\n")));
        let keywords = &self.dashboard.config.keywords;
        if keywords.construction == construction
            && keywords.humanoid == humanoid
            && keywords.other == other
        {
            return;
        }

        let config = Arc::make_mut(&mut self.dashboard.config);
        config.keywords.construction = construction;
        config.keywords.humanoid = humanoid;
        config.keywords.other = other;
        info!(
            primary = config.keywords.primary().len(),
            secondary = config.keywords.secondary().len(),
            "Search keywords updated"
        );
        self.notify(NoticeLevel::Info, "Search keywords updated.");
    }

    /// Update max scroll based on content
    pub fn update_scroll_bounds(&mut self, content_height: u16, viewport_height: u16) {
        self.max_scroll = content_height.saturating_sub(viewport_height);
        if self.scroll_offset > self.max_scroll {
            self.scroll_offset = self.max_scroll;
        }
    }
}

fn keyword_area(keywords: &[String]) -> TextArea<'static> {
    let mut area = TextArea::new(keywords.to_vec());
    area.set_cursor_line_style(ratatui::style::Style::default());
    area.set_placeholder_text("One keyword per line...");
    area
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::NewsBatch;
    use crate::llm::provider::{AdapterFactory, LLMAdapter};
    use crate::report::ReportGenerator;
    use crate::search::{NewsSearchBackend, SearchError, SearchHit, SearchQuery};
    use crate::storage::{CredentialStore, HistoryStore, MemoryBackend};
    use crate::types::{AppResult, LLMRequest, LLMResponse, TokenUsage};
    use crate::search::NewsRetriever;
    use async_trait::async_trait;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use std::time::Duration;
    use tempfile::TempDir;

    struct FixedAdapter;

    #[async_trait]
    impl LLMAdapter for FixedAdapter {
        async fn create_chat_completion(&self, _request: &LLMRequest) -> AppResult<LLMResponse> {
            Ok(LLMResponse {
                content: "generated".to_string(),
                finish_reason: "STOP".to_string(),
                usage: TokenUsage::default(),
            })
        }
    }

    struct NoNews;

    #[async_trait]
    impl NewsSearchBackend for NoNews {
        async fn search(&self, _query: &SearchQuery) -> Result<Vec<SearchHit>, SearchError> {
            Ok(Vec::new())
        }
    }

    fn entry(n: usize) -> HistoryEntry {
        HistoryEntry {
            timestamp: format!("2026-10-{:02} 09:00:00", n + 1),
            kind: "파일 분석".to_string(),
            content: format!("report {}", n),
        }
    }

    fn build_app(temp_dir: &TempDir, credential: &str, history: Vec<HistoryEntry>) -> App {
        let config = Config::with_data_dir(temp_dir.path().to_path_buf());
        let history_store = HistoryStore::new(Arc::new(MemoryBackend::with_history(history.clone())));
        let credentials = CredentialStore::new(Arc::new(MemoryBackend::new()));
        let factory: AdapterFactory =
            Arc::new(|_: &str| -> Box<dyn LLMAdapter> { Box::new(FixedAdapter) });
        let generator = ReportGenerator::with_factory(&config.llm, history_store.clone(), factory);
        let retriever = NewsRetriever::new(Arc::new(NoNews), &config.search).with_delay(Duration::ZERO);
        let dashboard = Dashboard::new(config, credentials, history_store, retriever, generator);
        App::new(dashboard, Session::new(credential), history)
    }

    fn char_key(c: char) -> AppAction {
        AppAction::Input(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
    }

    #[tokio::test]
    async fn test_tabs_cycle_both_ways() {
        let temp_dir = TempDir::new().unwrap();
        let mut app = build_app(&temp_dir, "k", Vec::new());

        app.handle_action(AppAction::NextField).await;
        assert_eq!(app.tab, AnalysisKind::FileAnalysis);
        app.handle_action(AppAction::NextField).await;
        app.handle_action(AppAction::NextField).await;
        assert_eq!(app.tab, AnalysisKind::WeeklyNews);
        app.handle_action(AppAction::PrevField).await;
        assert_eq!(app.tab, AnalysisKind::Integrated);
    }

    #[tokio::test]
    async fn test_run_needs_credential_and_idle_state() {
        let temp_dir = TempDir::new().unwrap();
        let mut app = build_app(&temp_dir, "", Vec::new());
        app.handle_action(AppAction::Run).await;
        assert!(!app.busy);
        assert_eq!(app.notices.last().unwrap().level, NoticeLevel::Error);

        let mut app = build_app(&temp_dir, "k", Vec::new());
        app.busy = true;
        app.handle_action(AppAction::Run).await;
        assert_eq!(app.stage, TaskStage::Idle);
        assert!(app.notices.last().unwrap().text.contains("already running"));
    }

    #[tokio::test]
    async fn test_integrated_and_export_need_reports() {
        let temp_dir = TempDir::new().unwrap();
        let mut app = build_app(&temp_dir, "k", Vec::new());
        app.tab = AnalysisKind::Integrated;

        app.handle_action(AppAction::Run).await;
        assert!(!app.busy);
        app.handle_action(AppAction::ExportPdf).await;
        assert!(!app.busy);
        assert!(app.notices.last().unwrap().text.contains("No report"));
    }

    #[tokio::test]
    async fn test_file_tab_collects_paths() {
        let temp_dir = TempDir::new().unwrap();
        let mut app = build_app(&temp_dir, "k", Vec::new());
        app.tab = AnalysisKind::FileAnalysis;

        app.handle_action(AppAction::Run).await;
        assert!(!app.busy);

        for c in "a.pdf".chars() {
            app.handle_action(char_key(c)).await;
        }
        app.handle_action(AppAction::Submit).await;
        for c in "\"b.txt\"".chars() {
            app.handle_action(char_key(c)).await;
        }
        assert_eq!(app.file_paths(), vec![PathBuf::from("a.pdf"), PathBuf::from("b.txt")]);
    }

    #[tokio::test]
    async fn test_history_focus_toggles_and_deletes() {
        let temp_dir = TempDir::new().unwrap();
        let mut app = build_app(&temp_dir, "k", (0..3).map(entry).collect());
        assert_eq!(app.session.history_selection, Some(vec![0, 1, 2]));

        app.handle_action(AppAction::ToggleHistoryFocus).await;
        app.handle_action(AppAction::ScrollDown).await;
        app.handle_action(AppAction::Submit).await;
        assert_eq!(app.session.history_selection, Some(vec![0, 2]));

        app.handle_action(AppAction::ScrollUp).await;
        app.handle_action(AppAction::DeleteHistory).await;
        assert_eq!(app.history, vec![entry(1), entry(2)]);
        assert_eq!(app.session.history_selection, Some(vec![1]));
        assert_eq!(app.dashboard.history.load().await.len(), 2);
    }

    #[tokio::test]
    async fn test_settings_save_key_and_keywords() {
        let temp_dir = TempDir::new().unwrap();
        let mut app = build_app(&temp_dir, "", Vec::new());

        app.handle_action(AppAction::ToggleSettings).await;
        app.handle_action(char_key('e')).await;
        for c in "new-key".chars() {
            app.handle_action(char_key(c)).await;
        }
        app.handle_action(AppAction::Submit).await;
        assert_eq!(app.session.credential, "new-key");
        assert_eq!(app.dashboard.credentials.load().await, "new-key");

        // Other robot keywords
        app.handle_action(AppAction::PrevField).await;
        assert_eq!(app.settings_field(), SettingsField::Other);
        app.keyword_inputs[2] = TextArea::new(vec!["AMR".to_string(), " ".to_string()]);
        app.handle_action(AppAction::ToggleSettings).await;

        assert_eq!(app.view, View::Dashboard);
        assert_eq!(app.dashboard.config.keywords.other, vec!["AMR"]);
        assert_eq!(app.dashboard.config.keywords.secondary(), vec!["AMR"]);
    }

    #[test]
    fn test_weekly_done_shows_search_failures_verbatim() {
        let temp_dir = TempDir::new().unwrap();
        let mut app = build_app(&temp_dir, "k", Vec::new());
        app.busy = true;

        let failure = "Search failed (keyword: 휴머노이드): Search request failed: 429";
        app.handle_event(AppEvent::WeeklyDone(Box::new(WeeklyOutcome {
            batch: NewsBatch::default(),
            report: ReportOutcome {
                text: "주간".to_string(),
                warnings: Vec::new(),
            },
            search_warnings: vec![failure.to_string()],
        })));

        assert!(!app.busy);
        assert_eq!(app.session.report(AnalysisKind::WeeklyNews), Some("주간"));
        let warnings: Vec<&str> = app
            .notices
            .iter()
            .filter(|n| n.level == NoticeLevel::Warning)
            .map(|n| n.text.as_str())
            .collect();
        assert_eq!(warnings, vec![failure]);
    }

    #[test]
    fn test_events_update_reports_and_stage() {
        let temp_dir = TempDir::new().unwrap();
        let mut app = build_app(&temp_dir, "k", Vec::new());
        app.busy = true;

        app.handle_event(AppEvent::IntegratedDone(ReportOutcome {
            text: "통합".to_string(),
            warnings: vec!["History could not be saved".to_string()],
        }));
        assert!(!app.busy);
        assert_eq!(app.session.report(AnalysisKind::Integrated), Some("통합"));
        assert!(matches!(app.stage, TaskStage::Complete(_)));
        assert!(app
            .notices
            .iter()
            .any(|n| n.level == NoticeLevel::Warning));

        app.busy = true;
        app.handle_event(AppEvent::Error("boom".to_string()));
        assert!(!app.busy);
        assert_eq!(app.stage, TaskStage::Error("boom".to_string()));
    }
}
