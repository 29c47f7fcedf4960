#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use agentic_rag::agent::{AgentTrace, FallbackAgent};
use agentic_rag::core::errors::RagError;
use agentic_rag::graph::nodes::AgentFactory;
use agentic_rag::llm::{ChatRequest, LlmProvider, LlmService};
use agentic_rag::rag::{Document, Embedder, Retriever};
use agentic_rag::tools::KnowledgeTool;

/// Chat replies are served from a queue; every request is recorded.
#[derive(Default)]
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedProvider {
    pub fn new<I, S>(replies: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn chat(&self, request: ChatRequest, _model_id: &str) -> Result<String, RagError> {
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| RagError::Llm("no scripted reply left".to_string()))
    }

    async fn embed(&self, inputs: &[String], _model_id: &str) -> Result<Vec<Vec<f32>>, RagError> {
        Ok(inputs.iter().map(|text| keyword_vector(text)).collect())
    }
}

pub fn llm(provider: &Arc<ScriptedProvider>) -> LlmService {
    LlmService::new(provider.clone(), "test-model")
}

const VOCABULARY: [&str; 8] = [
    "rust", "python", "agent", "memory", "planning", "tool", "vector", "wikipedia",
];

/// Counts of a small fixed vocabulary; texts sharing words land close together.
pub fn keyword_vector(text: &str) -> Vec<f32> {
    let lower = text.to_lowercase();
    VOCABULARY
        .iter()
        .map(|word| lower.matches(word).count() as f32)
        .collect()
}

pub struct KeywordEmbedder;

#[async_trait]
impl Embedder for KeywordEmbedder {
    fn model_name(&self) -> &str {
        "keyword-test"
    }

    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        Ok(texts.iter().map(|text| keyword_vector(text)).collect())
    }
}

/// Always returns the same documents.
pub struct StaticRetriever {
    pub docs: Vec<Document>,
    pub queries: Mutex<Vec<String>>,
}

impl StaticRetriever {
    pub fn new(docs: Vec<Document>) -> Arc<Self> {
        Arc::new(Self {
            docs,
            queries: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl Retriever for StaticRetriever {
    async fn retrieve(&self, query: &str) -> Result<Vec<Document>, RagError> {
        self.queries.lock().unwrap().push(query.to_string());
        Ok(self.docs.clone())
    }
}

/// Returns a canned trace and counts invocations.
pub struct CannedAgent {
    pub trace: AgentTrace,
    pub calls: AtomicUsize,
}

#[async_trait]
impl FallbackAgent for CannedAgent {
    async fn invoke(&self, _question: &str) -> Result<AgentTrace, RagError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.trace.clone())
    }
}

/// Factory handing out one shared [`CannedAgent`]; counts constructions.
pub fn canned_factory(trace: AgentTrace) -> (AgentFactory, Arc<CannedAgent>, Arc<AtomicUsize>) {
    let agent = Arc::new(CannedAgent {
        trace,
        calls: AtomicUsize::new(0),
    });
    let built = Arc::new(AtomicUsize::new(0));

    let shared = agent.clone();
    let counter = built.clone();
    let factory: AgentFactory = Arc::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        let agent: Arc<dyn FallbackAgent> = shared.clone();
        Ok(agent)
    });

    (factory, agent, built)
}

pub struct FakeTool {
    pub reply: Result<String, String>,
    pub queries: Mutex<Vec<String>>,
}

impl FakeTool {
    pub fn ok(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(reply.to_string()),
            queries: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(message.to_string()),
            queries: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl KnowledgeTool for FakeTool {
    fn name(&self) -> &str {
        "wikipedia"
    }

    fn description(&self) -> &str {
        "Search Wikipedia for general knowledge"
    }

    async fn run(&self, query: &str) -> Result<String, RagError> {
        self.queries.lock().unwrap().push(query.to_string());
        self.reply.clone().map_err(RagError::Tool)
    }
}

pub fn doc(content: &str, source: &str) -> Document {
    Document::new(content, source)
}
