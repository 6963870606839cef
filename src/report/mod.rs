//! Report Generation
//!
//! Builds a prompt for one of the three report variants, calls the model
//! once and records a truncated copy of the result in the history store.

pub mod prompts;

use crate::config::LLMConfig;
use crate::llm::provider::{gemini_factory, AdapterFactory, LLM};
use crate::models::{AnalysisKind, NewsBatch};
use crate::storage::HistoryStore;
use crate::types::{AppError, AppResult, LLMMessage, LLMRequest};
use chrono::Local;
use tracing::{error, info, warn};

/// Whether earlier analyses are fed back into the weekly prompt
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HistoryContext {
    #[default]
    Exclude,
    /// `selection: None` uses the most recent entries
    Include { selection: Option<Vec<usize>> },
}

/// Generated report text plus non-fatal problems (e.g. history not saved)
#[derive(Debug, Clone, PartialEq)]
pub struct ReportOutcome {
    pub text: String,
    pub warnings: Vec<String>,
}

#[derive(Clone)]
pub struct ReportGenerator {
    model: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    history: HistoryStore,
    factory: AdapterFactory,
}

impl ReportGenerator {
    pub fn new(config: &LLMConfig, history: HistoryStore) -> Self {
        Self::with_factory(config, history, gemini_factory(config.base_url.clone()))
    }

    pub fn with_factory(config: &LLMConfig, history: HistoryStore, factory: AdapterFactory) -> Self {
        Self {
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            history,
            factory,
        }
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Weekly robot-industry report from a news batch
    pub async fn weekly_news(
        &self,
        batch: &NewsBatch,
        credential: &str,
        history: HistoryContext,
    ) -> AppResult<ReportOutcome> {
        Self::require_credential(credential)?;

        let digest = match history {
            HistoryContext::Exclude => None,
            HistoryContext::Include { selection } => {
                Some(self.history.summarize(selection.as_deref()).await)
            }
        };

        let date = Local::now().format(prompts::PROMPT_DATE_FORMAT).to_string();
        let prompt = prompts::weekly_news_prompt(batch, digest.as_deref(), &date);

        info!(
            primary = batch.primary.len(),
            secondary = batch.secondary.len(),
            with_history = digest.is_some(),
            "Generating weekly news report"
        );
        self.run(AnalysisKind::WeeklyNews, credential, prompt).await
    }

    /// Report over text extracted from uploaded documents
    pub async fn file_analysis(&self, document_text: &str, credential: &str) -> AppResult<ReportOutcome> {
        Self::require_credential(credential)?;

        if document_text.trim().is_empty() {
            return Err(AppError::InvalidRequest(
                "No readable text in the uploaded files".to_string(),
            ));
        }

        info!(chars = document_text.chars().count(), "Generating file analysis report");
        self.run(
            AnalysisKind::FileAnalysis,
            credential,
            prompts::file_analysis_prompt(document_text),
        )
        .await
    }

    /// Report combining a weekly news report with a file analysis report
    pub async fn integrated(
        &self,
        news_report: &str,
        file_report: &str,
        credential: &str,
    ) -> AppResult<ReportOutcome> {
        Self::require_credential(credential)?;

        info!("Generating integrated report");
        self.run(
            AnalysisKind::Integrated,
            credential,
            prompts::integrated_prompt(news_report, file_report),
        )
        .await
    }

    fn require_credential(credential: &str) -> AppResult<()> {
        if credential.trim().is_empty() {
            return Err(AppError::MissingCredential);
        }
        Ok(())
    }

    async fn run(&self, kind: AnalysisKind, credential: &str, prompt: String) -> AppResult<ReportOutcome> {
        let llm = LLM::from_adapter((self.factory)(credential));

        let request = LLMRequest {
            model: self.model.clone(),
            messages: vec![LLMMessage::user(prompt)],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            system_instruction: None,
        };

        let response = llm.create_chat_completion(&request).await.map_err(|e| {
            error!(kind = %kind, error = %e, "Report generation failed");
            e
        })?;

        let text = response.content;
        if text.trim().is_empty() {
            return Err(AppError::LLMApi("Model returned an empty report".to_string()));
        }

        let mut warnings = Vec::new();
        if let Err(e) = self.history.append(kind, &text).await {
            warn!(kind = %kind, error = %e, "Report generated but not saved to history");
            warnings.push(format!("History save failed: {}", e));
        }

        info!(
            kind = %kind,
            chars = text.chars().count(),
            total_tokens = response.usage.total_tokens,
            "Report generated"
        );
        Ok(ReportOutcome { text, warnings })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::llm::provider::LLMAdapter;
    use crate::models::{HistoryEntry, SearchResult};
    use crate::storage::MemoryBackend;
    use crate::types::{LLMResponse, TokenUsage};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    /// Adapter that records prompts and answers with a fixed reply
    struct FakeAdapter {
        reply: Result<String, String>,
        prompts: Arc<Mutex<Vec<(String, String)>>>,
        credential: String,
    }

    #[async_trait]
    impl LLMAdapter for FakeAdapter {
        async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse> {
            self.prompts
                .lock()
                .unwrap()
                .push((self.credential.clone(), request.messages[0].content.clone()));
            match &self.reply {
                Ok(text) => Ok(LLMResponse {
                    content: text.clone(),
                    finish_reason: "STOP".to_string(),
                    usage: TokenUsage::default(),
                }),
                Err(msg) => Err(AppError::LLMApi(msg.clone())),
            }
        }
    }

    struct Harness {
        generator: ReportGenerator,
        prompts: Arc<Mutex<Vec<(String, String)>>>,
    }

    fn harness_with(reply: Result<&str, &str>, backend: Arc<MemoryBackend>) -> Harness {
        let prompts = Arc::new(Mutex::new(Vec::new()));
        let reply = reply.map(String::from).map_err(String::from);
        let recorded = prompts.clone();
        let factory: AdapterFactory = Arc::new(move |credential: &str| -> Box<dyn LLMAdapter> {
            Box::new(FakeAdapter {
                reply: reply.clone(),
                prompts: recorded.clone(),
                credential: credential.to_string(),
            })
        });
        let config = Config::with_data_dir(std::env::temp_dir());
        let generator =
            ReportGenerator::with_factory(&config.llm, HistoryStore::new(backend.clone()), factory);
        Harness { generator, prompts }
    }

    fn harness(reply: Result<&str, &str>) -> Harness {
        harness_with(reply, Arc::new(MemoryBackend::new()))
    }

    fn batch() -> NewsBatch {
        NewsBatch {
            primary: vec![SearchResult {
                title: "옵티머스 공개".to_string(),
                snippet: "새 버전".to_string(),
                url: "https://a.example".to_string(),
                keyword: "테슬라 옵티머스".to_string(),
            }],
            secondary: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_missing_credential_makes_no_call() {
        let h = harness(Ok("report"));
        let err = h
            .generator
            .weekly_news(&batch(), "  ", HistoryContext::Exclude)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::MissingCredential));
        assert!(matches!(
            h.generator.integrated("a", "b", "").await,
            Err(AppError::MissingCredential)
        ));
        assert!(h.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_weekly_report_is_returned_and_recorded() {
        let h = harness(Ok("## 주간 분석"));
        let outcome = h
            .generator
            .weekly_news(&batch(), "key-1", HistoryContext::Exclude)
            .await
            .unwrap();

        assert_eq!(outcome.text, "## 주간 분석");
        assert!(outcome.warnings.is_empty());

        let prompts = h.prompts.lock().unwrap();
        assert_eq!(prompts[0].0, "key-1");
        assert!(prompts[0].1.contains("제목: 옵티머스 공개"));
        assert!(!prompts[0].1.contains("**이전 분석 참고:**"));

        let history = h.generator.history().load().await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].kind, "주간 뉴스 분석");
        assert_eq!(history[0].content, "## 주간 분석");
    }

    #[tokio::test]
    async fn test_history_selection_is_spliced_into_prompt() {
        let entries = vec![
            HistoryEntry {
                timestamp: "2026-10-05 09:00:00".to_string(),
                kind: "주간 뉴스 분석".to_string(),
                content: "지난주 요약".to_string(),
            },
            HistoryEntry {
                timestamp: "2026-10-12 09:00:00".to_string(),
                kind: "파일 분석".to_string(),
                content: "문서 요약".to_string(),
            },
        ];
        let h = harness_with(Ok("report"), Arc::new(MemoryBackend::with_history(entries)));

        h.generator
            .weekly_news(
                &batch(),
                "k",
                HistoryContext::Include {
                    selection: Some(vec![1]),
                },
            )
            .await
            .unwrap();

        let prompts = h.prompts.lock().unwrap();
        assert!(prompts[0].1.contains("**이전 분석 참고:**\n=== 이전 분석 히스토리 ==="));
        assert!(prompts[0].1.contains("요약: 문서 요약..."));
        assert!(!prompts[0].1.contains("지난주 요약"));
    }

    #[tokio::test]
    async fn test_model_failure_is_an_error_and_not_recorded() {
        let h = harness(Err("quota exceeded"));
        let err = h.generator.file_analysis("본문", "k").await.unwrap_err();
        assert!(err.to_string().contains("quota exceeded"));
        assert!(h.generator.history().load().await.is_empty());
    }

    #[tokio::test]
    async fn test_empty_report_is_rejected() {
        let h = harness(Ok("   "));
        assert!(h.generator.integrated("a", "b", "k").await.is_err());
        assert!(h.generator.history().load().await.is_empty());
    }

    #[tokio::test]
    async fn test_empty_document_text_is_invalid() {
        let h = harness(Ok("report"));
        assert!(matches!(
            h.generator.file_analysis(" \n ", "k").await,
            Err(AppError::InvalidRequest(_))
        ));
        assert!(h.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_history_write_failure_becomes_warning() {
        let backend = Arc::new(MemoryBackend::new());
        backend.fail_writes(true);
        let h = harness_with(Ok("통합 리포트"), backend);

        let outcome = h.generator.integrated("뉴스", "파일", "k").await.unwrap();
        assert_eq!(outcome.text, "통합 리포트");
        assert_eq!(outcome.warnings.len(), 1);
        assert!(h.generator.history().load().await.is_empty());
    }
}
