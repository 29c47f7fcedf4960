//! Tool-using fallback agent, consulted when retrieval finds nothing.

mod decision;
mod instructions;
mod react;
mod trace;

use async_trait::async_trait;

use crate::core::errors::RagError;

pub use decision::{parse_agent_decision, AgentDecision};
pub use instructions::{build_agent_instructions, AGENT_SYSTEM_PROMPT};
pub use react::ReactAgent;
pub use trace::{AgentMessage, AgentTrace, MessageRole, ToolCallRecord};

/// Runs a question through a tool-augmented loop and returns what it emitted.
#[async_trait]
pub trait FallbackAgent: Send + Sync {
    async fn invoke(&self, question: &str) -> Result<AgentTrace, RagError>;
}
