use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::agent::{FallbackAgent, ReactAgent};
use crate::core::config::{AppPaths, ConfigService, RagConfig};
use crate::core::errors::RagError;
use crate::graph::nodes::AgentFactory;
use crate::graph::{GraphDeps, RagGraph, RagState};
use crate::llm::LlmService;
use crate::rag::{DocumentProcessor, Embedder, IndexManifest, ProviderEmbedder, VectorStore};
use crate::tools::{ToolRegistry, WikipediaSearch};

/// Everything a command needs: configuration, the document pipeline, the
/// vector store and the chat model.
#[derive(Clone)]
pub struct AppState {
    pub paths: Arc<AppPaths>,
    pub config_service: ConfigService,
    pub config: Arc<RagConfig>,
    pub processor: Arc<DocumentProcessor>,
    pub vector_store: Arc<VectorStore>,
    pub llm: LlmService,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn initialize() -> Result<Self, RagError> {
        Self::with_paths(Arc::new(AppPaths::new()))
    }

    /// Loads configuration under `paths` and builds the OpenAI-backed services.
    pub fn with_paths(paths: Arc<AppPaths>) -> Result<Self, RagError> {
        let config_service = ConfigService::new(paths.clone());
        let config = config_service.load_config()?;

        let llm = config.get_llm()?;
        let embedder = Arc::new(ProviderEmbedder::new(
            llm.provider(),
            config.embedding.model.clone(),
            config.embedding.batch_size,
        ));

        Self::from_parts(paths, config, llm, embedder)
    }

    /// Assembles state from already-built collaborators.
    pub fn from_parts(
        paths: Arc<AppPaths>,
        config: RagConfig,
        llm: LlmService,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self, RagError> {
        let config_service = ConfigService::new(paths.clone());
        let processor = DocumentProcessor::from_config(&config.ingestion)?;
        let vector_store = VectorStore::from_config(embedder, &config.retrieval);

        Ok(Self {
            paths,
            config_service,
            config: Arc::new(config),
            processor: Arc::new(processor),
            vector_store: Arc::new(vector_store),
            llm,
            started_at: Utc::now(),
        })
    }

    pub fn index_dir(&self) -> PathBuf {
        self.config.index_path(&self.paths.index_dir)
    }

    /// Explicit sources, or the configured defaults when none are given.
    pub fn resolve_sources(&self, sources: &[String]) -> Vec<String> {
        if sources.is_empty() {
            self.config.ingestion.default_sources.clone()
        } else {
            sources.to_vec()
        }
    }

    /// Loads, splits and indexes `sources`. Returns the chunk count.
    pub async fn ingest(&self, sources: &[String]) -> Result<usize, RagError> {
        let sources = self.resolve_sources(sources);
        let chunks = self.processor.process(&sources).await;
        let count = chunks.len();
        if count == 0 {
            tracing::warn!("No documents were loaded; the index will be empty");
        }
        self.vector_store.build(chunks).await?;
        Ok(count)
    }

    pub async fn save_index(&self, path: &Path) -> Result<IndexManifest, RagError> {
        self.vector_store.save(path).await
    }

    pub async fn load_index(&self, path: &Path) -> Result<IndexManifest, RagError> {
        self.vector_store.load(path).await
    }

    /// Wikipedia-backed ReAct agent, built on demand by the responder.
    pub fn agent_factory(&self) -> AgentFactory {
        let llm = self.llm.clone();
        let settings = self.config.agent.clone();
        Arc::new(move || {
            let wikipedia = WikipediaSearch::from_config(&settings)?;
            let tools = ToolRegistry::new().with_tool(Arc::new(wikipedia));
            let agent: Arc<dyn FallbackAgent> =
                Arc::new(ReactAgent::from_config(llm.clone(), tools, &settings));
            Ok(agent)
        })
    }

    /// Graph over the current index. Fails if nothing has been built or loaded.
    pub fn build_graph(&self) -> Result<RagGraph, RagError> {
        self.build_graph_with(self.agent_factory())
    }

    pub fn build_graph_with(&self, agent_factory: AgentFactory) -> Result<RagGraph, RagError> {
        let retriever = Arc::new(self.vector_store.get_retriever()?);
        let deps = GraphDeps {
            retriever,
            llm: self.llm.clone(),
            agent_factory,
            answer: self.config.answer.clone(),
        };
        RagGraph::build(self.config.graph.variant, self.config.graph.max_steps, deps)
    }

    pub async fn ask(&self, question: &str) -> Result<RagState, RagError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(RagError::BadRequest("Question must not be empty".to_string()));
        }
        self.build_graph()?.run(question).await
    }
}
