use std::sync::Arc;

use crate::core::errors::RagError;
use crate::llm::provider::LlmProvider;
use crate::llm::types::{ChatMessage, ChatRequest};

/// Chat model handle: a provider bound to one model and its sampling defaults.
#[derive(Clone)]
pub struct LlmService {
    provider: Arc<dyn LlmProvider>,
    model: String,
    temperature: Option<f64>,
    max_tokens: Option<i32>,
}

impl LlmService {
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_sampling(mut self, temperature: Option<f64>, max_tokens: Option<i32>) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn provider(&self) -> Arc<dyn LlmProvider> {
        self.provider.clone()
    }

    /// One synchronous round trip over role-tagged messages.
    pub async fn invoke(&self, messages: Vec<ChatMessage>) -> Result<String, RagError> {
        let request = ChatRequest::new(messages)
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens);

        tracing::debug!(
            "LLM call via {} (model={}, messages={})",
            self.provider.name(),
            self.model,
            request.messages.len()
        );
        self.provider.chat(request, &self.model).await
    }

    pub async fn invoke_prompt(&self, prompt: impl Into<String>) -> Result<String, RagError> {
        let request = ChatRequest::from_prompt(prompt);
        self.invoke(request.messages).await
    }
}
