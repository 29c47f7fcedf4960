// ReAct loop for the fallback agent
// The model decides per turn whether to call a tool or answer.

use async_trait::async_trait;

use super::decision::{parse_agent_decision, AgentDecision};
use super::instructions::build_agent_instructions;
use super::trace::{AgentMessage, AgentTrace, ToolCallRecord};
use super::FallbackAgent;
use crate::core::config::AgentSettings;
use crate::core::errors::RagError;
use crate::llm::{ChatMessage, LlmService};
use crate::tools::ToolRegistry;

pub struct ReactAgent {
    llm: LlmService,
    tools: ToolRegistry,
    max_steps: usize,
}

impl ReactAgent {
    pub fn new(llm: LlmService, tools: ToolRegistry) -> Self {
        Self {
            llm,
            tools,
            max_steps: 6,
        }
    }

    pub fn from_config(llm: LlmService, tools: ToolRegistry, settings: &AgentSettings) -> Self {
        Self::new(llm, tools).with_max_steps(settings.max_steps)
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }
}

#[async_trait]
impl FallbackAgent for ReactAgent {
    async fn invoke(&self, question: &str) -> Result<AgentTrace, RagError> {
        let mut messages = vec![
            ChatMessage::system(build_agent_instructions(&self.tools.describe())),
            ChatMessage::user(question),
        ];
        let mut trace = AgentTrace::default();

        for step in 0..self.max_steps {
            tracing::debug!("Agent reasoning step {}/{}", step + 1, self.max_steps);

            let response = self.llm.invoke(messages.clone()).await?;

            match parse_agent_decision(&response) {
                AgentDecision::Final(content) => {
                    trace.push(AgentMessage::assistant(content));
                    return Ok(trace);
                }
                AgentDecision::ToolCall { name, args } => {
                    tracing::info!("Agent calling tool `{}`", name);
                    trace.push(AgentMessage::tool_request(ToolCallRecord::new(
                        name.clone(),
                        args.clone(),
                    )));
                    messages.push(ChatMessage::assistant(response));

                    let observation = match self.tools.execute(&name, &args).await {
                        Ok(output) => {
                            messages.push(ChatMessage::system(format!(
                                "Tool `{}` result:\n{}",
                                name, output
                            )));
                            output
                        }
                        Err(err) => {
                            let failure = format!("Tool `{}` failed: {}", name, err);
                            tracing::warn!("{}", failure);
                            messages.push(ChatMessage::system(failure.clone()));
                            failure
                        }
                    };
                    trace.push(AgentMessage::tool(observation));
                }
            }
        }

        tracing::warn!(
            "Agent reached the maximum of {} step(s) without a final answer",
            self.max_steps
        );
        Ok(trace)
    }
}
