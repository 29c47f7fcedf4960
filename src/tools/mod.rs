//! Tools the fallback agent may call.

mod wikipedia;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::core::errors::RagError;

pub use wikipedia::{
    format_pages, parse_extracts, parse_search_hits, WikipediaHit, WikipediaPage, WikipediaSearch,
    NO_RESULT,
};

/// A text-in, text-out knowledge lookup.
#[async_trait]
pub trait KnowledgeTool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    async fn run(&self, query: &str) -> Result<String, RagError>;
}

#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn KnowledgeTool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tool(mut self, tool: Arc<dyn KnowledgeTool>) -> Self {
        self.register(tool);
        self
    }

    pub fn register(&mut self, tool: Arc<dyn KnowledgeTool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn KnowledgeTool>> {
        self.tools.get(name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// `- name: description` lines for prompts.
    pub fn describe(&self) -> String {
        self.tools
            .values()
            .map(|tool| format!("- {}: {}", tool.name(), tool.description()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub async fn execute(&self, name: &str, args: &Value) -> Result<String, RagError> {
        let tool = self
            .get(name)
            .ok_or_else(|| RagError::BadRequest(format!("Unknown tool: {}", name)))?;

        let query = match args {
            Value::String(s) => s.trim().to_string(),
            other => other
                .get("query")
                .or_else(|| other.get("q"))
                .or_else(|| other.get("input"))
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .trim()
                .to_string(),
        };

        if query.is_empty() {
            return Err(RagError::BadRequest("Search query missing".to_string()));
        }

        tool.run(&query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Echo;

    #[async_trait]
    impl KnowledgeTool for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Repeats the query"
        }

        async fn run(&self, query: &str) -> Result<String, RagError> {
            Ok(format!("echo: {}", query))
        }
    }

    #[tokio::test]
    async fn execute_accepts_common_argument_shapes() {
        let registry = ToolRegistry::new().with_tool(Arc::new(Echo));

        for args in [json!({"query": "rust"}), json!({"input": " rust "}), json!("rust")] {
            assert_eq!(registry.execute("echo", &args).await.unwrap(), "echo: rust");
        }
    }

    #[tokio::test]
    async fn execute_rejects_unknown_tools_and_empty_queries() {
        let registry = ToolRegistry::new().with_tool(Arc::new(Echo));

        let unknown = registry.execute("search", &json!("q")).await.unwrap_err();
        assert!(unknown.to_string().contains("Unknown tool"));

        let empty = registry.execute("echo", &json!({"query": "  "})).await.unwrap_err();
        assert!(matches!(empty, RagError::BadRequest(_)));
    }

    #[test]
    fn describe_lists_registered_tools() {
        let registry = ToolRegistry::new().with_tool(Arc::new(Echo));
        assert_eq!(registry.names(), vec!["echo".to_string()]);
        assert_eq!(registry.describe(), "- echo: Repeats the query");
    }
}
