// Graph Builder
// Wires the answer pipeline for the configured variant

use std::sync::Arc;

use tracing::Instrument;

use super::node::{GraphError, NodeContext};
use super::nodes::{AgentFactory, GenerateNode, ResponderNode, RetrieveNode};
use super::runtime::{GraphBuilder, GraphRuntime};
use super::state::RagState;
use crate::core::config::{AnswerSettings, GraphVariant};
use crate::core::errors::RagError;
use crate::llm::LlmService;
use crate::rag::Retriever;

/// Collaborators shared by the graph nodes.
#[derive(Clone)]
pub struct GraphDeps {
    pub retriever: Arc<dyn Retriever>,
    pub llm: LlmService,
    pub agent_factory: AgentFactory,
    pub answer: AnswerSettings,
}

/// `agentic`: a single `responder` node, entry and terminal.
/// `simple`: `retrieve` -> `generate`.
pub fn build_rag_graph(
    variant: GraphVariant,
    max_steps: usize,
    deps: GraphDeps,
) -> Result<GraphRuntime, GraphError> {
    match variant {
        GraphVariant::Agentic => GraphBuilder::new()
            .entry("responder")
            .max_steps(max_steps)
            .node(Box::new(
                ResponderNode::new(deps.retriever, deps.llm, deps.agent_factory)
                    .with_answer_settings(&deps.answer),
            ))
            .build(),
        GraphVariant::Simple => GraphBuilder::new()
            .entry("retrieve")
            .max_steps(max_steps)
            .node(Box::new(RetrieveNode::new(deps.retriever)))
            .node(Box::new(GenerateNode::new(deps.llm)))
            .edge("retrieve", "generate")
            .build(),
    }
}

pub struct RagGraph {
    runtime: GraphRuntime,
}

impl RagGraph {
    pub fn new(runtime: GraphRuntime) -> Self {
        Self { runtime }
    }

    pub fn build(variant: GraphVariant, max_steps: usize, deps: GraphDeps) -> Result<Self, RagError> {
        Ok(Self::new(build_rag_graph(variant, max_steps, deps)?))
    }

    pub fn runtime(&self) -> &GraphRuntime {
        &self.runtime
    }

    /// Runs one question through the graph from a fresh state.
    pub async fn run(&self, question: &str) -> Result<RagState, RagError> {
        let mut state = RagState::new(question);
        let mut ctx = NodeContext::new();
        let span = tracing::info_span!("rag_run", run_id = %ctx.run_id);

        self.runtime
            .run(&mut state, &mut ctx)
            .instrument(span)
            .await?;

        if !state.has_answer() {
            tracing::warn!("Graph finished without an answer");
        }
        Ok(state)
    }
}
