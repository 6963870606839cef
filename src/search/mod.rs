//! Search Module
//!
//! News retrieval for keyword groups:
//! - `serpapi`: DuckDuckGo web search through SerpAPI (the production backend)
//! - `retrieval`: per-keyword fan-in with URL dedup and rate limiting

pub mod retrieval;
pub mod serpapi;

pub use retrieval::{NewsRetriever, RetrievalOutcome};
pub use serpapi::SerpApiClient;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during search operations
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("SerpAPI key not configured")]
    NoApiKey,

    #[error("Search request failed: {0}")]
    RequestFailed(String),

    #[error("Failed to parse search results: {0}")]
    ParseError(String),
}

/// Parameters of one outbound web search
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub keyword: String,
    pub region: String,
    pub safe_search: bool,
    /// Recency window (`w` = past week)
    pub time_limit: String,
    pub max_results: usize,
}

/// A raw hit as returned by the search engine
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub title: String,
    pub body: String,
    pub href: String,
}

/// A web search engine that can be queried for one keyword at a time
#[async_trait]
pub trait NewsSearchBackend: Send + Sync {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchHit>, SearchError>;
}
