//! Operator session and the actions run against it.
//!
//! [`Session`] is the per-operator state the dashboard keeps between
//! actions. [`Dashboard`] bundles the stores and clients those actions need;
//! it is cheap to clone so a TUI can move a copy into a background task.

use crate::config::Config;
use crate::export::{export_report, ExportError, ExportFormat, ExportedFile};
use crate::extract::{extract_batch, UploadedFile};
use crate::models::{AnalysisKind, HistoryEntry, NewsBatch};
use crate::report::{HistoryContext, ReportGenerator, ReportOutcome};
use crate::search::NewsRetriever;
use crate::storage::{CredentialStore, HistoryStore, StoreError};
use crate::types::{AppError, AppResult};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// State carried across operator actions
#[derive(Debug, Clone)]
pub struct Session {
    pub credential: String,
    /// News behind the last weekly report
    pub news: Option<NewsBatch>,
    weekly_report: Option<String>,
    file_report: Option<String>,
    integrated_report: Option<String>,
    /// Feed earlier analyses into the weekly prompt
    pub use_history: bool,
    /// History indices the operator ticked; `None` means the most recent entries
    pub history_selection: Option<Vec<usize>>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            credential: String::new(),
            news: None,
            weekly_report: None,
            file_report: None,
            integrated_report: None,
            use_history: true,
            history_selection: None,
        }
    }
}

impl Session {
    pub fn new(credential: impl Into<String>) -> Self {
        Self {
            credential: credential.into(),
            ..Self::default()
        }
    }

    pub fn report(&self, kind: AnalysisKind) -> Option<&str> {
        match kind {
            AnalysisKind::WeeklyNews => self.weekly_report.as_deref(),
            AnalysisKind::FileAnalysis => self.file_report.as_deref(),
            AnalysisKind::Integrated => self.integrated_report.as_deref(),
        }
    }

    pub fn set_report(&mut self, kind: AnalysisKind, text: String) {
        let slot = match kind {
            AnalysisKind::WeeklyNews => &mut self.weekly_report,
            AnalysisKind::FileAnalysis => &mut self.file_report,
            AnalysisKind::Integrated => &mut self.integrated_report,
        };
        *slot = Some(text);
    }

    /// Both source reports, once they exist
    pub fn integration_inputs(&self) -> Option<(&str, &str)> {
        Some((self.weekly_report.as_deref()?, self.file_report.as_deref()?))
    }

    pub fn history_context(&self) -> HistoryContext {
        if self.use_history {
            HistoryContext::Include {
                selection: self.history_selection.clone(),
            }
        } else {
            HistoryContext::Exclude
        }
    }

    /// Tick every entry of a history list of `len` items
    pub fn select_all_history(&mut self, len: usize) {
        self.history_selection = Some((0..len).collect());
    }

    pub fn is_history_selected(&self, index: usize) -> bool {
        match &self.history_selection {
            Some(selection) => selection.contains(&index),
            None => true,
        }
    }

    pub fn toggle_history(&mut self, index: usize, len: usize) {
        let selection = self
            .history_selection
            .get_or_insert_with(|| (0..len).collect());
        if let Some(pos) = selection.iter().position(|&i| i == index) {
            selection.remove(pos);
        } else {
            selection.push(index);
            selection.sort_unstable();
        }
    }

    /// Carry the selection over a reload of the history list. Entries keep
    /// their state; entries not seen before start selected.
    pub fn reconcile_history(&mut self, before: &[HistoryEntry], after: &[HistoryEntry]) {
        let Some(selection) = &self.history_selection else {
            return;
        };
        let kept: Vec<&HistoryEntry> = selection.iter().filter_map(|&i| before.get(i)).collect();
        self.history_selection = Some(
            after
                .iter()
                .enumerate()
                .filter(|(_, entry)| kept.contains(entry) || !before.contains(entry))
                .map(|(i, _)| i)
                .collect(),
        );
    }
}

/// Progress of the weekly news action
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WeeklyProgress<'a> {
    /// About to search keyword `index` of `total`
    Searching {
        index: usize,
        total: usize,
        keyword: &'a str,
    },
    /// Search finished, the model is writing the report
    Generating { articles: usize },
}

/// Result of the weekly news action
#[derive(Debug, Clone)]
pub struct WeeklyOutcome {
    pub batch: NewsBatch,
    pub report: ReportOutcome,
    /// One message per keyword whose search failed, naming the keyword and the error
    pub search_warnings: Vec<String>,
}

/// Result of the file analysis action
#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub report: ReportOutcome,
    pub used_files: Vec<String>,
    /// Files that could not be read or decoded
    pub file_warnings: Vec<String>,
}

#[derive(Clone)]
pub struct Dashboard {
    pub config: Arc<Config>,
    pub credentials: CredentialStore,
    pub history: HistoryStore,
    pub retriever: NewsRetriever,
    pub generator: ReportGenerator,
}

impl Dashboard {
    /// Wire file-backed stores and the production search/model clients
    pub fn from_config(config: Config) -> Self {
        let credentials = CredentialStore::at_path(config.storage.api_key_path());
        let history = HistoryStore::at_path(config.storage.history_path());
        let retriever = NewsRetriever::from_config(&config.search);
        let generator = ReportGenerator::new(&config.llm, history.clone());
        Self::new(config, credentials, history, retriever, generator)
    }

    pub fn new(
        config: Config,
        credentials: CredentialStore,
        history: HistoryStore,
        retriever: NewsRetriever,
        generator: ReportGenerator,
    ) -> Self {
        Self {
            config: Arc::new(config),
            credentials,
            history,
            retriever,
            generator,
        }
    }

    /// Fresh session with the stored credential, or the environment key if none is stored
    pub async fn open_session(&self) -> Session {
        let mut credential = self.credentials.load().await;
        if credential.is_empty() {
            credential = self.config.llm.google_api_key.trim().to_string();
        }
        Session::new(credential)
    }

    /// Persist a new credential and make it the session's
    pub async fn update_credential(&self, session: &mut Session, credential: &str) -> Result<(), StoreError> {
        let credential = credential.trim();
        session.credential = credential.to_string();
        self.credentials.save(credential).await
    }

    /// Search both keyword groups, then write the weekly report
    pub async fn weekly_news<F>(
        &self,
        credential: &str,
        history: HistoryContext,
        mut on_progress: F,
    ) -> AppResult<WeeklyOutcome>
    where
        F: FnMut(WeeklyProgress<'_>) + Send,
    {
        if credential.trim().is_empty() {
            return Err(AppError::MissingCredential);
        }

        let (batch, search_warnings) = self
            .retriever
            .fetch_batch(&self.config.keywords, &self.config.search, |index, total, keyword| {
                on_progress(WeeklyProgress::Searching {
                    index,
                    total,
                    keyword,
                })
            })
            .await;

        if batch.is_empty() {
            warn!(failures = search_warnings.len(), "No news found for any keyword");
            return Err(AppError::InvalidRequest(
                "No news found. Check the keywords or the search API key.".to_string(),
            ));
        }

        info!(total = batch.total(), "News collected");
        on_progress(WeeklyProgress::Generating {
            articles: batch.total(),
        });
        let report = self.generator.weekly_news(&batch, credential, history).await?;
        Ok(WeeklyOutcome {
            batch,
            report,
            search_warnings,
        })
    }

    /// Read the given files and analyze their combined text
    pub async fn analyze_files(&self, paths: &[PathBuf], credential: &str) -> AppResult<FileOutcome> {
        if credential.trim().is_empty() {
            return Err(AppError::MissingCredential);
        }

        let mut files = Vec::with_capacity(paths.len());
        let mut read_warnings = Vec::new();
        for path in paths {
            match UploadedFile::from_path(path).await {
                Ok(file) => files.push(file),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Could not read uploaded file");
                    read_warnings.push(e.to_string());
                }
            }
        }

        self.analyze_uploaded(&files, credential)
            .await
            .map(|mut outcome| {
                read_warnings.append(&mut outcome.file_warnings);
                outcome.file_warnings = read_warnings;
                outcome
            })
    }

    pub async fn analyze_uploaded(&self, files: &[UploadedFile], credential: &str) -> AppResult<FileOutcome> {
        let batch = extract_batch(files);
        let report = self.generator.file_analysis(&batch.text, credential).await?;
        Ok(FileOutcome {
            report,
            used_files: batch.used_files,
            file_warnings: batch.warnings,
        })
    }

    pub async fn integrated(&self, session: &Session) -> AppResult<ReportOutcome> {
        let (news, file) = session.integration_inputs().ok_or_else(|| {
            AppError::InvalidRequest(
                "Run the weekly news analysis and the file analysis first".to_string(),
            )
        })?;
        self.generator.integrated(news, file, &session.credential).await
    }

    pub async fn export(
        &self,
        kind: AnalysisKind,
        format: ExportFormat,
        text: &str,
    ) -> Result<ExportedFile, ExportError> {
        export_report(
            kind,
            format,
            text,
            &self.config.export,
            &self.config.storage.export_dir,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::provider::{AdapterFactory, LLMAdapter};
    use crate::search::{NewsSearchBackend, SearchError, SearchHit, SearchQuery};
    use crate::storage::MemoryBackend;
    use crate::types::{LLMRequest, LLMResponse, TokenUsage};
    use async_trait::async_trait;
    use std::time::Duration;
    use tempfile::TempDir;

    struct EchoAdapter;

    #[async_trait]
    impl LLMAdapter for EchoAdapter {
        async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse> {
            let prompt = &request.messages[0].content;
            Ok(LLMResponse {
                content: format!("report over {} chars", prompt.chars().count()),
                finish_reason: "STOP".to_string(),
                usage: TokenUsage::default(),
            })
        }
    }

    /// Answers every keyword with one URL derived from it
    struct KeywordBackend;

    #[async_trait]
    impl NewsSearchBackend for KeywordBackend {
        async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchHit>, SearchError> {
            if query.keyword == "down" {
                return Err(SearchError::RequestFailed("503".to_string()));
            }
            Ok(vec![SearchHit {
                title: query.keyword.clone(),
                body: "snippet".to_string(),
                href: format!("https://news.example/{}", query.keyword),
            }])
        }
    }

    struct EmptyBackend;

    #[async_trait]
    impl NewsSearchBackend for EmptyBackend {
        async fn search(&self, _query: &SearchQuery) -> Result<Vec<SearchHit>, SearchError> {
            Ok(Vec::new())
        }
    }

    fn dashboard(temp_dir: &TempDir, backend: Arc<dyn NewsSearchBackend>) -> Dashboard {
        let mut config = Config::with_data_dir(temp_dir.path().to_path_buf());
        config.keywords.construction = vec!["건설 로봇".to_string(), "down".to_string()];
        config.keywords.humanoid = vec!["휴머노이드 로봇".to_string()];
        config.keywords.other = vec!["AMR".to_string()];

        let history = HistoryStore::new(Arc::new(MemoryBackend::new()));
        let credentials = CredentialStore::new(Arc::new(MemoryBackend::new()));
        let factory: AdapterFactory = Arc::new(|_: &str| -> Box<dyn LLMAdapter> { Box::new(EchoAdapter) });
        let generator = ReportGenerator::with_factory(&config.llm, history.clone(), factory);
        let retriever = NewsRetriever::new(backend, &config.search).with_delay(Duration::ZERO);
        Dashboard::new(config, credentials, history, retriever, generator)
    }

    #[test]
    fn test_session_reports_and_integration_inputs() {
        let mut session = Session::new("k");
        assert!(session.integration_inputs().is_none());

        session.set_report(AnalysisKind::WeeklyNews, "news".to_string());
        assert!(session.integration_inputs().is_none());
        session.set_report(AnalysisKind::FileAnalysis, "file".to_string());
        assert_eq!(session.integration_inputs(), Some(("news", "file")));
        assert_eq!(session.report(AnalysisKind::Integrated), None);
    }

    #[test]
    fn test_history_context_follows_opt_in() {
        let mut session = Session::default();
        assert_eq!(session.history_context(), HistoryContext::Include { selection: None });

        session.use_history = false;
        assert_eq!(session.history_context(), HistoryContext::Exclude);
    }

    fn entry(n: usize) -> HistoryEntry {
        HistoryEntry {
            timestamp: format!("2026-10-{:02} 09:00:00", n + 1),
            kind: "주간 뉴스 분석".to_string(),
            content: format!("report {}", n),
        }
    }

    #[test]
    fn test_history_selection_toggles() {
        let mut session = Session::default();
        assert!(session.is_history_selected(3));

        session.toggle_history(1, 4);
        assert_eq!(session.history_selection, Some(vec![0, 2, 3]));
        assert!(!session.is_history_selected(1));
        session.toggle_history(1, 4);
        assert_eq!(session.history_selection, Some(vec![0, 1, 2, 3]));

        session.select_all_history(2);
        assert_eq!(session.history_selection, Some(vec![0, 1]));
    }

    #[test]
    fn test_reconcile_history_after_delete_and_append() {
        let before: Vec<HistoryEntry> = (0..4).map(entry).collect();
        let mut session = Session::default();
        session.history_selection = Some(vec![0, 2, 3]);

        // entry 2 deleted, entry 4 appended
        let after = vec![entry(0), entry(1), entry(3), entry(4)];
        session.reconcile_history(&before, &after);
        assert_eq!(session.history_selection, Some(vec![0, 2, 3]));

        let mut untouched = Session::default();
        untouched.reconcile_history(&before, &after);
        assert_eq!(untouched.history_selection, None);
    }

    #[tokio::test]
    async fn test_weekly_news_flow() {
        let temp_dir = TempDir::new().unwrap();
        let dashboard = dashboard(&temp_dir, Arc::new(KeywordBackend));

        let mut seen = Vec::new();
        let outcome = dashboard
            .weekly_news("key", HistoryContext::Exclude, |progress| {
                seen.push(match progress {
                    WeeklyProgress::Searching { index, total, keyword } => {
                        format!("{}/{} {}", index + 1, total, keyword)
                    }
                    WeeklyProgress::Generating { articles } => format!("generating {}", articles),
                })
            })
            .await
            .unwrap();

        assert_eq!(outcome.batch.primary.len(), 2);
        assert_eq!(outcome.batch.secondary.len(), 1);
        assert_eq!(
            outcome.search_warnings,
            vec!["Search failed (keyword: down): Search request failed: 503".to_string()]
        );
        assert!(outcome.report.text.starts_with("report over"));
        assert_eq!(seen.len(), 5);
        assert_eq!(seen[0], "1/4 건설 로봇");
        assert_eq!(seen[4], "generating 3");
        assert_eq!(dashboard.history.load().await.len(), 1);
    }

    #[tokio::test]
    async fn test_weekly_news_requires_credential_and_results() {
        let temp_dir = TempDir::new().unwrap();
        let dashboard = dashboard(&temp_dir, Arc::new(EmptyBackend));

        assert!(matches!(
            dashboard.weekly_news("", HistoryContext::Exclude, |_| {}).await,
            Err(AppError::MissingCredential)
        ));
        assert!(matches!(
            dashboard.weekly_news("k", HistoryContext::Exclude, |_| {}).await,
            Err(AppError::InvalidRequest(_))
        ));
        assert!(dashboard.history.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_analyze_files_reports_unreadable_paths() {
        let temp_dir = TempDir::new().unwrap();
        let dashboard = dashboard(&temp_dir, Arc::new(EmptyBackend));
        let note = temp_dir.path().join("note.txt");
        std::fs::write(&note, "협동로봇 도입 계획").unwrap();

        let outcome = dashboard
            .analyze_files(&[note, temp_dir.path().join("missing.txt")], "k")
            .await
            .unwrap();
        assert_eq!(outcome.used_files, vec!["note.txt"]);
        assert_eq!(outcome.file_warnings.len(), 1);
    }

    #[tokio::test]
    async fn test_integrated_needs_both_reports() {
        let temp_dir = TempDir::new().unwrap();
        let dashboard = dashboard(&temp_dir, Arc::new(EmptyBackend));
        let mut session = Session::new("k");

        assert!(matches!(
            dashboard.integrated(&session).await,
            Err(AppError::InvalidRequest(_))
        ));

        session.set_report(AnalysisKind::WeeklyNews, "news".to_string());
        session.set_report(AnalysisKind::FileAnalysis, "file".to_string());
        assert!(dashboard.integrated(&session).await.is_ok());
    }

    #[tokio::test]
    async fn test_credential_update_and_env_fallback() {
        let temp_dir = TempDir::new().unwrap();
        let mut dashboard = dashboard(&temp_dir, Arc::new(EmptyBackend));

        let mut config = (*dashboard.config).clone();
        config.llm.google_api_key = "env-key".to_string();
        dashboard.config = Arc::new(config);
        assert_eq!(dashboard.open_session().await.credential, "env-key");

        let mut session = dashboard.open_session().await;
        dashboard.update_credential(&mut session, " stored-key ").await.unwrap();
        assert_eq!(session.credential, "stored-key");
        assert_eq!(dashboard.open_session().await.credential, "stored-key");
    }

    #[tokio::test]
    async fn test_export_writes_into_export_dir() {
        let temp_dir = TempDir::new().unwrap();
        let dashboard = dashboard(&temp_dir, Arc::new(EmptyBackend));
        let exported = dashboard
            .export(AnalysisKind::WeeklyNews, ExportFormat::Docx, "본문")
            .await
            .unwrap();
        assert!(exported.path.starts_with(temp_dir.path().join("exports")));
    }
}
