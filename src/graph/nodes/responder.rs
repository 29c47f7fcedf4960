// Responder Node
// Retrieval first; the fallback agent only runs when retrieval is empty

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;

use crate::agent::FallbackAgent;
use crate::core::config::AnswerSettings;
use crate::core::errors::RagError;
use crate::graph::node::{GraphError, Node, NodeContext, NodeOutput};
use crate::graph::state::RagState;
use crate::llm::{ChatMessage, LlmService};
use crate::rag::{Document, Retriever};

pub const SUMMARY_SYSTEM_PROMPT: &str = "You are a helpful assistant. Summarize the following information \
in 2-3 concise sentences to directly answer the user's question. \
Focus on the main ideas and avoid including unnecessary details.";

pub const NO_ANSWER: &str = "Could not generate the answer";

/// Builds the fallback agent the first time it is needed.
pub type AgentFactory =
    Arc<dyn Fn() -> Result<Arc<dyn FallbackAgent>, RagError> + Send + Sync>;

pub struct ResponderNode {
    retriever: Arc<dyn Retriever>,
    llm: LlmService,
    agent_factory: AgentFactory,
    agent: OnceCell<Arc<dyn FallbackAgent>>,
    context_docs: usize,
    summarize_threshold: usize,
}

impl ResponderNode {
    pub fn new(retriever: Arc<dyn Retriever>, llm: LlmService, agent_factory: AgentFactory) -> Self {
        Self {
            retriever,
            llm,
            agent_factory,
            agent: OnceCell::new(),
            context_docs: 3,
            summarize_threshold: 500,
        }
    }

    pub fn with_answer_settings(mut self, settings: &AnswerSettings) -> Self {
        self.context_docs = settings.context_docs.max(1);
        self.summarize_threshold = settings.summarize_threshold;
        self
    }

    async fn summarize(&self, question: &str, context: &str) -> Result<String, RagError> {
        let response = self
            .llm
            .invoke(vec![
                ChatMessage::system(SUMMARY_SYSTEM_PROMPT),
                ChatMessage::user(format!("Question: {}\n\nContext: {}", question, context)),
            ])
            .await?;
        Ok(response.trim().to_string())
    }

    async fn fallback_agent(&self) -> Result<Arc<dyn FallbackAgent>, RagError> {
        self.agent
            .get_or_try_init(|| async {
                tracing::info!("Building fallback agent");
                (self.agent_factory)()
            })
            .await
            .cloned()
    }

    /// Answers `question`, returning the answer and whatever retrieval produced.
    pub async fn generate_answer(&self, question: &str) -> Result<(String, Vec<Document>), RagError> {
        let retrieved_docs = self.retriever.retrieve(question).await?;

        if !retrieved_docs.is_empty() {
            let context = retrieved_docs
                .iter()
                .take(self.context_docs)
                .map(|doc| doc.content.as_str())
                .collect::<Vec<_>>()
                .join("\n\n");
            tracing::info!(
                "Answering from {} retrieved chunk(s)",
                retrieved_docs.len().min(self.context_docs)
            );
            let answer = self.summarize(question, &context).await?;
            return Ok((answer, retrieved_docs));
        }

        tracing::info!("No documents retrieved, falling back to agent");
        let agent = self.fallback_agent().await?;
        let trace = agent.invoke(question).await?;

        let answer = match trace.collect_content() {
            None => NO_ANSWER.to_string(),
            Some(combined) if combined.chars().count() > self.summarize_threshold => {
                tracing::debug!("Fallback output is long, summarizing");
                self.summarize(question, &combined).await?
            }
            Some(combined) => combined,
        };

        Ok((answer, retrieved_docs))
    }
}

#[async_trait]
impl Node for ResponderNode {
    fn id(&self) -> &'static str {
        "responder"
    }

    fn name(&self) -> &'static str {
        "Responder"
    }

    async fn execute(
        &self,
        state: &mut RagState,
        _ctx: &mut NodeContext,
    ) -> Result<NodeOutput, GraphError> {
        let (answer, retrieved_docs) = self
            .generate_answer(&state.question)
            .await
            .map_err(|err| GraphError::from_rag(self.id(), err))?;

        state.answer = answer;
        state.retrieved_docs = retrieved_docs;
        Ok(NodeOutput::Final)
    }
}
