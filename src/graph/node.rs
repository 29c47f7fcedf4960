// Node trait and types
// Base abstraction for graph nodes

use async_trait::async_trait;

use crate::core::errors::RagError;

use super::state::RagState;

/// Context passed to nodes during execution
#[derive(Debug, Clone)]
pub struct NodeContext {
    /// Identifier of the current run, used in log lines
    pub run_id: String,
    /// Zero-based step counter maintained by the runtime
    pub step: usize,
}

impl NodeContext {
    pub fn new() -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            step: 0,
        }
    }
}

impl Default for NodeContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Output from a node execution
#[derive(Debug, Clone, PartialEq)]
pub enum NodeOutput {
    /// Continue to the specified next node (None = use default edge)
    Continue(Option<String>),
    /// Graph execution complete
    Final,
    /// Error occurred
    Error(String),
}

/// Graph execution error
///
/// `execution_trace` lists the node IDs visited before the failure,
/// most-recent last.
#[derive(Debug, Clone)]
pub struct GraphError {
    pub node_id: String,
    pub message: String,
    pub execution_trace: Vec<String>,
}

impl GraphError {
    pub fn new(node_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            message: message.into(),
            execution_trace: Vec::new(),
        }
    }

    pub fn from_rag(node_id: impl Into<String>, err: RagError) -> Self {
        Self::new(node_id, err.to_string())
    }

    pub fn with_trace(mut self, trace: Vec<String>) -> Self {
        self.execution_trace = trace;
        self
    }
}

impl From<GraphError> for RagError {
    fn from(err: GraphError) -> Self {
        RagError::Internal(err.to_string())
    }
}

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.execution_trace.is_empty() {
            write!(f, "Graph error in {}: {}", self.node_id, self.message)
        } else {
            write!(
                f,
                "Graph error in {} (trace: {}): {}",
                self.node_id,
                self.execution_trace.join(" -> "),
                self.message
            )
        }
    }
}

impl std::error::Error for GraphError {}

/// Node trait - all graph nodes implement this
#[async_trait]
pub trait Node: Send + Sync {
    /// Unique identifier for this node
    fn id(&self) -> &'static str;

    /// Human-readable name for display
    fn name(&self) -> &'static str {
        self.id()
    }

    async fn execute(
        &self,
        state: &mut RagState,
        ctx: &mut NodeContext,
    ) -> Result<NodeOutput, GraphError>;
}
