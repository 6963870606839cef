use async_trait::async_trait;
use crate::types::{AppResult, LLMRequest, LLMResponse};
use std::sync::Arc;

#[async_trait]
pub trait LLMAdapter: Send + Sync {
    async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse>;
}

/// Builds an adapter for a credential; swapped out in tests
pub type AdapterFactory = Arc<dyn Fn(&str) -> Box<dyn LLMAdapter> + Send + Sync>;

pub struct LLM {
    adapter: Box<dyn LLMAdapter>,
}

impl LLM {
    pub fn from_adapter(adapter: Box<dyn LLMAdapter>) -> Self {
        Self { adapter }
    }

    pub async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse> {
        self.adapter.create_chat_completion(request).await
    }
}

/// Factory producing Gemini adapters against `base_url`
pub fn gemini_factory(base_url: String) -> AdapterFactory {
    Arc::new(move |api_key: &str| -> Box<dyn LLMAdapter> {
        Box::new(crate::llm::google::GoogleAdapter::with_base_url(api_key, &base_url))
    })
}
