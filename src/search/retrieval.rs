//! News retrieval over a keyword list.
//!
//! Keywords are searched strictly in order with a fixed pause after each
//! call. URLs are deduplicated across the whole call (first keyword wins) and
//! a failing keyword only costs its own results.

use super::{NewsSearchBackend, SearchQuery, SerpApiClient};
use crate::config::{KeywordConfig, SearchConfig};
use crate::models::{NewsBatch, SearchResult};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Results of one retrieval call plus the non-fatal per-keyword failures
#[derive(Debug, Clone, Default)]
pub struct RetrievalOutcome {
    pub results: Vec<SearchResult>,
    pub warnings: Vec<String>,
}

#[derive(Clone)]
pub struct NewsRetriever {
    backend: Arc<dyn NewsSearchBackend>,
    region: String,
    safe_search: bool,
    time_limit: String,
    delay: Duration,
}

impl NewsRetriever {
    pub fn new(backend: Arc<dyn NewsSearchBackend>, config: &SearchConfig) -> Self {
        Self {
            backend,
            region: config.region.clone(),
            safe_search: config.safe_search,
            time_limit: config.time_limit.clone(),
            delay: Duration::from_millis(config.delay_ms),
        }
    }

    /// Retriever using the SerpAPI backend
    pub fn from_config(config: &SearchConfig) -> Self {
        Self::new(Arc::new(SerpApiClient::new(config.serpapi_key.clone())), config)
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub async fn search(&self, keywords: &[String], max_results: usize) -> RetrievalOutcome {
        self.search_with_progress(keywords, max_results, |_, _, _| {})
            .await
    }

    /// Like [`search`](Self::search), calling `on_keyword(index, total, keyword)`
    /// before each keyword is queried
    pub async fn search_with_progress<F>(
        &self,
        keywords: &[String],
        max_results: usize,
        mut on_keyword: F,
    ) -> RetrievalOutcome
    where
        F: FnMut(usize, usize, &str) + Send,
    {
        let mut outcome = RetrievalOutcome::default();
        let mut seen_urls: HashSet<String> = HashSet::new();

        for (index, keyword) in keywords.iter().enumerate() {
            on_keyword(index, keywords.len(), keyword);

            let query = SearchQuery {
                keyword: keyword.clone(),
                region: self.region.clone(),
                safe_search: self.safe_search,
                time_limit: self.time_limit.clone(),
                max_results,
            };

            match self.backend.search(&query).await {
                Ok(hits) => {
                    for hit in hits {
                        if hit.href.is_empty() || !seen_urls.insert(hit.href.clone()) {
                            continue;
                        }
                        outcome.results.push(SearchResult {
                            title: hit.title,
                            snippet: hit.body,
                            url: hit.href,
                            keyword: keyword.clone(),
                        });
                    }
                }
                Err(e) => {
                    warn!(keyword = %keyword, error = %e, "Keyword search failed");
                    outcome
                        .warnings
                        .push(format!("Search failed (keyword: {}): {}", keyword, e));
                    continue;
                }
            }

            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
        }

        info!(
            keywords = keywords.len(),
            results = outcome.results.len(),
            failures = outcome.warnings.len(),
            "News retrieval completed"
        );
        outcome
    }

    /// Search both keyword groups: group A first, then group B
    pub async fn fetch_batch<F>(
        &self,
        keywords: &KeywordConfig,
        config: &SearchConfig,
        mut on_keyword: F,
    ) -> (NewsBatch, Vec<String>)
    where
        F: FnMut(usize, usize, &str) + Send,
    {
        let primary_keywords = keywords.primary();
        let secondary_keywords = keywords.secondary();
        let total = primary_keywords.len() + secondary_keywords.len();

        let primary = self
            .search_with_progress(&primary_keywords, config.primary_max_results, |i, _, kw| {
                on_keyword(i, total, kw)
            })
            .await;
        let offset = primary_keywords.len();
        let secondary = self
            .search_with_progress(&secondary_keywords, config.secondary_max_results, |i, _, kw| {
                on_keyword(offset + i, total, kw)
            })
            .await;

        let mut warnings = primary.warnings;
        warnings.extend(secondary.warnings);

        (
            NewsBatch {
                primary: primary.results,
                secondary: secondary.results,
            },
            warnings,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::search::{SearchError, SearchHit};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Backend answering from a fixed keyword -> URLs table
    struct FakeBackend {
        answers: HashMap<String, Result<Vec<&'static str>, String>>,
        queries: Mutex<Vec<SearchQuery>>,
    }

    impl FakeBackend {
        fn new(answers: Vec<(&str, Result<Vec<&'static str>, String>)>) -> Self {
            Self {
                answers: answers
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v))
                    .collect(),
                queries: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl NewsSearchBackend for FakeBackend {
        async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchHit>, SearchError> {
            self.queries.lock().unwrap().push(query.clone());
            match self.answers.get(&query.keyword) {
                Some(Ok(urls)) => Ok(urls
                    .iter()
                    .take(query.max_results)
                    .map(|url| SearchHit {
                        title: format!("title {}", url),
                        body: format!("body {}", url),
                        href: url.to_string(),
                    })
                    .collect()),
                Some(Err(msg)) => Err(SearchError::RequestFailed(msg.clone())),
                None => Ok(Vec::new()),
            }
        }
    }

    fn retriever(backend: Arc<FakeBackend>) -> NewsRetriever {
        let config = Config::with_data_dir(std::env::temp_dir());
        NewsRetriever::new(backend, &config.search).with_delay(Duration::ZERO)
    }

    fn keywords(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_dedup_across_keywords_first_wins() {
        let backend = Arc::new(FakeBackend::new(vec![
            ("k1", Ok(vec!["a", "b"])),
            ("k2", Ok(vec!["b", "c"])),
        ]));
        let outcome = retriever(backend).search(&keywords(&["k1", "k2"]), 5).await;

        let urls: Vec<&str> = outcome.results.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, vec!["a", "b", "c"]);
        assert_eq!(outcome.results[1].keyword, "k1");
        assert_eq!(outcome.results[2].keyword, "k2");
        assert_eq!(outcome.results[0].snippet, "body a");
        assert!(outcome.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_dedup_is_case_sensitive_and_skips_empty_urls() {
        let backend = Arc::new(FakeBackend::new(vec![(
            "k",
            Ok(vec!["https://x/A", "https://x/a", "", "https://x/A"]),
        )]));
        let outcome = retriever(backend).search(&keywords(&["k"]), 10).await;
        assert_eq!(outcome.results.len(), 2);
    }

    #[tokio::test]
    async fn test_failed_keyword_keeps_partial_results() {
        let backend = Arc::new(FakeBackend::new(vec![
            ("k1", Ok(vec!["a"])),
            ("bad", Err("rate limited".to_string())),
            ("k3", Ok(vec!["c"])),
        ]));
        let outcome = retriever(backend)
            .search(&keywords(&["k1", "bad", "k3"]), 5)
            .await;

        assert_eq!(outcome.results.len(), 2);
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].contains("bad"));
        assert!(outcome.warnings[0].contains("rate limited"));
    }

    #[tokio::test]
    async fn test_queries_carry_filters_and_limit() {
        let backend = Arc::new(FakeBackend::new(vec![("k", Ok(vec!["a", "b", "c"]))]));
        let outcome = retriever(backend.clone()).search(&keywords(&["k"]), 2).await;

        assert_eq!(outcome.results.len(), 2);
        let queries = backend.queries.lock().unwrap();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].region, "kr-kr");
        assert_eq!(queries[0].time_limit, "w");
        assert!(!queries[0].safe_search);
        assert_eq!(queries[0].max_results, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_between_keywords() {
        let backend = Arc::new(FakeBackend::new(vec![]));
        let retriever = retriever(backend).with_delay(Duration::from_secs(1));

        let started = tokio::time::Instant::now();
        retriever.search(&keywords(&["k1", "k2"]), 1).await;
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(2));
        assert!(elapsed < Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_fetch_batch_splits_groups_and_reports_progress() {
        let backend = Arc::new(FakeBackend::new(vec![
            ("c1", Ok(vec!["a", "b", "c", "d", "e", "f"])),
            ("h1", Ok(vec!["a", "g"])),
            ("o1", Ok(vec!["a", "x", "y", "z"])),
        ]));
        let mut config = Config::with_data_dir(std::env::temp_dir());
        config.keywords = KeywordConfig {
            construction: keywords(&["c1"]),
            humanoid: keywords(&["h1"]),
            other: keywords(&["o1"]),
        };

        let mut progress = Vec::new();
        let (batch, warnings) = retriever(backend)
            .fetch_batch(&config.keywords, &config.search, |i, total, kw| {
                progress.push((i, total, kw.to_string()))
            })
            .await;

        // group A: 5 from c1 plus g from h1; group B dedups only within itself
        assert_eq!(batch.primary.len(), 6);
        assert_eq!(batch.secondary.len(), 3);
        assert_eq!(batch.secondary[0].url, "a");
        assert!(warnings.is_empty());
        assert_eq!(
            progress,
            vec![
                (0, 3, "c1".to_string()),
                (1, 3, "h1".to_string()),
                (2, 3, "o1".to_string())
            ]
        );
    }
}
