//! SerpAPI Client
//!
//! Runs DuckDuckGo web searches through SerpAPI. DuckDuckGo's region,
//! safe-search and date filters map onto SerpAPI's `kl`, `safe` and `df`
//! parameters.

use super::{NewsSearchBackend, SearchError, SearchHit, SearchQuery};
use async_trait::async_trait;
use serde_json::Value;
use serpapi_search_rust::serp_api_search::SerpApiSearch;
use std::collections::HashMap;
use tracing::{debug, info};

const ENGINE: &str = "duckduckgo";

/// SerpAPI client for news search
pub struct SerpApiClient {
    api_key: String,
}

impl SerpApiClient {
    pub fn new(api_key: String) -> Self {
        Self { api_key }
    }

    fn build_params(query: &SearchQuery) -> HashMap<String, String> {
        let mut params = HashMap::<String, String>::new();
        params.insert("engine".to_string(), ENGINE.to_string());
        params.insert("q".to_string(), query.keyword.clone());
        params.insert("kl".to_string(), query.region.clone());
        // 1 = strict, -2 = off
        let safe = if query.safe_search { "1" } else { "-2" };
        params.insert("safe".to_string(), safe.to_string());
        params.insert("df".to_string(), query.time_limit.clone());
        params
    }
}

#[async_trait]
impl NewsSearchBackend for SerpApiClient {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchHit>, SearchError> {
        if self.api_key.is_empty() {
            return Err(SearchError::NoApiKey);
        }

        info!(query = %query.keyword, region = %query.region, "Searching DuckDuckGo via SerpAPI");

        let params = Self::build_params(query);
        let search = SerpApiSearch::new(ENGINE.to_string(), params, self.api_key.clone());

        let results = search
            .json()
            .await
            .map_err(|e| SearchError::RequestFailed(e.to_string()))?;

        debug!("Raw DuckDuckGo response received");

        let hits = parse_organic_results(&results, query.max_results)?;
        info!(count = hits.len(), query = %query.keyword, "DuckDuckGo search completed");
        Ok(hits)
    }
}

/// Pull `{title, snippet, link}` out of a SerpAPI response
fn parse_organic_results(results: &Value, max_results: usize) -> Result<Vec<SearchHit>, SearchError> {
    let organic_results = match results.get("organic_results") {
        Some(organic) => organic,
        None => {
            return match results.get("error").and_then(|v| v.as_str()) {
                // SerpAPI reports an empty result page as an error string
                Some(msg) if msg.contains("hasn't returned any results") => Ok(Vec::new()),
                Some(msg) => Err(SearchError::RequestFailed(msg.to_string())),
                None => Ok(Vec::new()),
            };
        }
    };

    let results_array = organic_results
        .as_array()
        .ok_or_else(|| SearchError::ParseError("Expected array of results".to_string()))?;

    let hits = results_array
        .iter()
        .take(max_results)
        .map(|result| {
            let field = |name: &str| {
                result
                    .get(name)
                    .and_then(|v| v.as_str())
                    .unwrap_or("")
                    .to_string()
            };
            SearchHit {
                title: field("title"),
                body: field("snippet"),
                href: field("link"),
            }
        })
        .collect();

    Ok(hits)
}
