use async_trait::async_trait;

use crate::graph::node::{GraphError, Node, NodeContext, NodeOutput};
use crate::graph::state::RagState;
use crate::llm::LlmService;

/// Plain context-stuffing answer over every retrieved chunk.
pub struct GenerateNode {
    llm: LlmService,
}

impl GenerateNode {
    pub fn new(llm: LlmService) -> Self {
        Self { llm }
    }
}

pub fn build_answer_prompt(question: &str, context: &str) -> String {
    format!(
        "Answer the question based on the context\nContext:\n{}\nQuestion:\n{}",
        context, question
    )
}

#[async_trait]
impl Node for GenerateNode {
    fn id(&self) -> &'static str {
        "generate"
    }

    fn name(&self) -> &'static str {
        "Generate"
    }

    async fn execute(
        &self,
        state: &mut RagState,
        _ctx: &mut NodeContext,
    ) -> Result<NodeOutput, GraphError> {
        let context = state
            .retrieved_docs
            .iter()
            .map(|doc| doc.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let answer = self
            .llm
            .invoke_prompt(build_answer_prompt(&state.question, &context))
            .await
            .map_err(|err| GraphError::from_rag(self.id(), err))?;

        state.answer = answer.trim().to_string();
        Ok(NodeOutput::Final)
    }
}
