use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    Assistant,
    Tool,
}

/// A tool invocation recorded on an assistant turn. Runtimes that attach
/// the tool output to the call itself use one of the three output fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub args: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_text: Option<String>,
}

impl ToolCallRecord {
    pub fn new(name: impl Into<String>, args: Value) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            args,
            ..Default::default()
        }
    }

    /// Output fields in `result`, `output`, `output_text` order, empty ones skipped.
    pub fn output_fields(&self) -> impl Iterator<Item = &str> {
        [&self.result, &self.output, &self.output_text]
            .into_iter()
            .filter_map(|field| field.as_deref())
            .filter(|text| !text.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentMessage {
    pub role: MessageRole,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCallRecord>,
}

impl AgentMessage {
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }

    pub fn tool_request(call: ToolCallRecord) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: String::new(),
            tool_calls: vec![call],
        }
    }

    pub fn tool(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Tool,
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }
}

/// Messages emitted by an agent run, in emission order. The input question
/// is not part of the trace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentTrace {
    pub messages: Vec<AgentMessage>,
}

impl AgentTrace {
    pub fn new(messages: Vec<AgentMessage>) -> Self {
        Self { messages }
    }

    pub fn push(&mut self, message: AgentMessage) {
        self.messages.push(message);
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Every non-empty message body plus tool-call output fields, in order.
    pub fn content_parts(&self) -> Vec<&str> {
        let mut parts = Vec::new();
        for message in &self.messages {
            if !message.content.is_empty() {
                parts.push(message.content.as_str());
            }
            for call in &message.tool_calls {
                parts.extend(call.output_fields());
            }
        }
        parts
    }

    /// Content parts joined by blank lines; `None` when the agent said nothing.
    pub fn collect_content(&self) -> Option<String> {
        let parts = self.content_parts();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("\n\n"))
        }
    }
}
