use std::sync::Arc;

use async_trait::async_trait;

use crate::core::errors::RagError;
use crate::llm::LlmProvider;

/// Text to vector function used by the vector store.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Identifier recorded alongside persisted indexes.
    fn model_name(&self) -> &str;

    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError>;

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, RagError> {
        self.embed_documents(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RagError::Llm("Failed to generate embedding for query".to_string()))
    }
}

/// Embeddings served by the configured LLM provider, sent in batches.
pub struct ProviderEmbedder {
    provider: Arc<dyn LlmProvider>,
    model: String,
    batch_size: usize,
}

impl ProviderEmbedder {
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>, batch_size: usize) -> Self {
        Self {
            provider,
            model: model.into(),
            batch_size: batch_size.max(1),
        }
    }
}

#[async_trait]
impl Embedder for ProviderEmbedder {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            let embedded = self.provider.embed(batch, &self.model).await?;
            if embedded.len() != batch.len() {
                return Err(RagError::Llm(format!(
                    "Missing embeddings: sent {}, received {}",
                    batch.len(),
                    embedded.len()
                )));
            }
            vectors.extend(embedded);
        }
        tracing::debug!("Embedded {} text(s) with {}", texts.len(), self.model);
        Ok(vectors)
    }
}
