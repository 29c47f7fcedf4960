use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::defaults;
use crate::core::errors::RagError;
use crate::llm::{LlmProvider, LlmService, OpenAiProvider};

/// Typed application configuration.
///
/// Every section falls back to its defaults, so an empty YAML file yields a
/// usable configuration apart from the API key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    pub llm: LlmSettings,
    pub embedding: EmbeddingSettings,
    pub ingestion: IngestionSettings,
    pub retrieval: RetrievalSettings,
    pub answer: AnswerSettings,
    pub agent: AgentSettings,
    pub graph: GraphSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub model: String,
    pub base_url: String,
    pub api_key: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<i32>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            model: defaults::LLM_MODEL.to_string(),
            base_url: defaults::LLM_BASE_URL.to_string(),
            api_key: None,
            temperature: None,
            max_tokens: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub model: String,
    pub batch_size: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            model: defaults::EMBEDDING_MODEL.to_string(),
            batch_size: defaults::EMBEDDING_BATCH_SIZE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestionSettings {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub default_sources: Vec<String>,
    pub web_timeout_secs: u64,
}

impl Default for IngestionSettings {
    fn default() -> Self {
        Self {
            chunk_size: defaults::CHUNK_SIZE,
            chunk_overlap: defaults::CHUNK_OVERLAP,
            default_sources: defaults::default_sources(),
            web_timeout_secs: defaults::WEB_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    pub top_k: usize,
    pub score_threshold: Option<f32>,
    pub index_path: Option<PathBuf>,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            top_k: defaults::RETRIEVER_TOP_K,
            score_threshold: None,
            index_path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnswerSettings {
    /// How many retrieved documents are fed to the summarizer.
    pub context_docs: usize,
    /// Fallback content longer than this (in chars) is summarized again.
    pub summarize_threshold: usize,
}

impl Default for AnswerSettings {
    fn default() -> Self {
        Self {
            context_docs: defaults::CONTEXT_DOCS,
            summarize_threshold: defaults::SUMMARIZE_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    pub max_steps: usize,
    pub wikipedia_lang: String,
    pub wikipedia_top_k: usize,
    pub wikipedia_max_chars: usize,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_steps: defaults::AGENT_MAX_STEPS,
            wikipedia_lang: defaults::WIKIPEDIA_LANG.to_string(),
            wikipedia_top_k: defaults::WIKIPEDIA_TOP_K,
            wikipedia_max_chars: defaults::WIKIPEDIA_MAX_CHARS,
        }
    }
}

/// Shape of the execution graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GraphVariant {
    /// Single responder node with the tool-using fallback.
    #[default]
    Agentic,
    /// Plain retrieve -> generate pipeline.
    Simple,
}

impl GraphVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            GraphVariant::Agentic => "agentic",
            GraphVariant::Simple => "simple",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphSettings {
    pub variant: GraphVariant,
    pub max_steps: usize,
}

impl Default for GraphSettings {
    fn default() -> Self {
        Self {
            variant: GraphVariant::default(),
            max_steps: defaults::GRAPH_MAX_STEPS,
        }
    }
}

impl RagConfig {
    /// Environment variables win over values read from the config files.
    pub fn apply_env_overrides(&mut self) {
        if let Some(key) = non_empty_env("OPENAI_API_KEY") {
            self.llm.api_key = Some(key);
        }
        if let Some(model) = non_empty_env("RAG_LLM_MODEL") {
            self.llm.model = model;
        }
        if let Some(base_url) = non_empty_env("RAG_LLM_BASE_URL") {
            self.llm.base_url = base_url;
        }
    }

    pub fn api_key(&self) -> Result<String, RagError> {
        self.llm
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                RagError::Config("OPENAI_API_KEY not found in environment variables".to_string())
            })
    }

    pub fn provider(&self) -> Result<Arc<dyn LlmProvider>, RagError> {
        let api_key = self.api_key()?;
        Ok(Arc::new(OpenAiProvider::new(
            self.llm.base_url.clone(),
            api_key,
        )))
    }

    /// Builds the chat model handle; fails fast when no credential is configured.
    pub fn get_llm(&self) -> Result<LlmService, RagError> {
        let provider = self.provider()?;
        Ok(LlmService::new(provider, self.llm.model.clone())
            .with_sampling(self.llm.temperature, self.llm.max_tokens))
    }

    pub fn index_path(&self, fallback: &std::path::Path) -> PathBuf {
        self.retrieval
            .index_path
            .clone()
            .unwrap_or_else(|| fallback.to_path_buf())
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}
