pub const AGENT_SYSTEM_PROMPT: &str = "You are a helpful RAG agent. Prefer user-provided documents first; \
use 'wikipedia' only if documents are insufficient. Return only the final useful answer.";

pub fn build_agent_instructions(tool_descriptions: &str) -> String {
    let tools = if tool_descriptions.trim().is_empty() {
        "None (answer without tools)".to_string()
    } else {
        format!("\n{}", tool_descriptions)
    };

    format!(
        "{AGENT_SYSTEM_PROMPT}\n\
You have access to the following tools: {tools}\n\
When you need to use a tool, respond ONLY with JSON in this format:\n\
{{\"type\":\"tool_call\",\"tool_name\":\"<tool>\",\"tool_args\":{{\"query\":\"...\"}}}}\n\
When you have the final answer, respond ONLY with JSON in this format:\n\
{{\"type\":\"final\",\"content\":\"...\"}}\n\
Do not include any extra text outside the JSON."
    )
}
