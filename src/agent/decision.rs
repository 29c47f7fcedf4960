use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum AgentDecision {
    Final(String),
    ToolCall { name: String, args: Value },
}

/// Reads a model turn. Anything that is not a recognised JSON action is
/// taken as the final answer text.
pub fn parse_agent_decision(text: &str) -> AgentDecision {
    if let Some(json_value) = parse_json_from_text(text) {
        if let Some(decision) = parse_decision_from_value(&json_value) {
            return decision;
        }
    }
    AgentDecision::Final(text.trim().to_string())
}

fn parse_json_from_text(text: &str) -> Option<Value> {
    let trimmed = strip_code_fence(text.trim());
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Some(value);
    }

    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str::<Value>(&trimmed[start..=end]).ok()
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn parse_decision_from_value(value: &Value) -> Option<AgentDecision> {
    let action_type = value
        .get("type")
        .or_else(|| value.get("action"))
        .and_then(|v| v.as_str())
        .unwrap_or("");

    match action_type {
        "tool_call" => {
            let name = value
                .get("tool_name")
                .or_else(|| value.get("name"))
                .or_else(|| value.get("tool"))
                .and_then(|v| v.as_str())?;
            let args = value
                .get("tool_args")
                .or_else(|| value.get("args"))
                .cloned()
                .unwrap_or_else(|| Value::Object(serde_json::Map::new()));
            Some(AgentDecision::ToolCall {
                name: name.to_string(),
                args,
            })
        }
        "final" => {
            let content = value
                .get("content")
                .or_else(|| value.get("message"))
                .or_else(|| value.get("response"))
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .trim()
                .to_string();
            Some(AgentDecision::Final(content))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_tool_call_with_aliases() {
        let decision = parse_agent_decision(
            r#"Sure. {"type":"tool_call","tool_name":"wikipedia","tool_args":{"query":"RAG"}}"#,
        );
        assert_eq!(
            decision,
            AgentDecision::ToolCall {
                name: "wikipedia".to_string(),
                args: json!({"query": "RAG"})
            }
        );

        let aliased = parse_agent_decision(r#"{"action":"tool_call","tool":"wikipedia"}"#);
        assert_eq!(
            aliased,
            AgentDecision::ToolCall {
                name: "wikipedia".to_string(),
                args: json!({})
            }
        );
    }

    #[test]
    fn parses_final_from_fenced_json() {
        let decision = parse_agent_decision("```json\n{\"type\":\"final\",\"content\":\" Paris \"}\n```");
        assert_eq!(decision, AgentDecision::Final("Paris".to_string()));
    }

    #[test]
    fn plain_text_is_final() {
        assert_eq!(
            parse_agent_decision("  The answer is 42.\n"),
            AgentDecision::Final("The answer is 42.".to_string())
        );
        assert_eq!(
            parse_agent_decision(r#"{"note": "unrelated json"}"#),
            AgentDecision::Final(r#"{"note": "unrelated json"}"#.to_string())
        );
    }
}
