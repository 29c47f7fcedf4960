pub const LLM_MODEL: &str = "gpt-4o-mini";
pub const LLM_BASE_URL: &str = "https://api.openai.com/v1";
pub const EMBEDDING_MODEL: &str = "text-embedding-3-small";
pub const EMBEDDING_BATCH_SIZE: usize = 64;

pub const CHUNK_SIZE: usize = 500;
pub const CHUNK_OVERLAP: usize = 50;
pub const WEB_TIMEOUT_SECS: u64 = 30;

pub const RETRIEVER_TOP_K: usize = 5;
pub const CONTEXT_DOCS: usize = 3;
pub const SUMMARIZE_THRESHOLD: usize = 500;

pub const AGENT_MAX_STEPS: usize = 6;
pub const WIKIPEDIA_LANG: &str = "en";
pub const WIKIPEDIA_TOP_K: usize = 3;
pub const WIKIPEDIA_MAX_CHARS: usize = 4000;

pub const GRAPH_MAX_STEPS: usize = 10;

pub fn default_sources() -> Vec<String> {
    vec![
        "https://lilianweng.github.io/posts/2023-06-23-agent/".to_string(),
        "https://lilianweng.github.io/posts/2024-07-07-hallucination/".to_string(),
        "https://lilianweng.github.io/posts/2023-10-25-adv-attack-llm/".to_string(),
    ]
}
