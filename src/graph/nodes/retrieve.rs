use std::sync::Arc;

use async_trait::async_trait;

use crate::graph::node::{GraphError, Node, NodeContext, NodeOutput};
use crate::graph::state::RagState;
use crate::rag::Retriever;

pub struct RetrieveNode {
    retriever: Arc<dyn Retriever>,
}

impl RetrieveNode {
    pub fn new(retriever: Arc<dyn Retriever>) -> Self {
        Self { retriever }
    }
}

#[async_trait]
impl Node for RetrieveNode {
    fn id(&self) -> &'static str {
        "retrieve"
    }

    fn name(&self) -> &'static str {
        "Retrieve"
    }

    async fn execute(
        &self,
        state: &mut RagState,
        _ctx: &mut NodeContext,
    ) -> Result<NodeOutput, GraphError> {
        state.retrieved_docs = self
            .retriever
            .retrieve(&state.question)
            .await
            .map_err(|err| GraphError::from_rag(self.id(), err))?;
        Ok(NodeOutput::Continue(None))
    }
}
