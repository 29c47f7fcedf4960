//! Vector store: embeds chunks into a [`FlatIndex`] and hands out retrievers.

use std::path::Path;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use super::document::Document;
use super::embedding::Embedder;
use super::index::{FlatIndex, IndexEntry, ScoredDocument};
use super::persist::{load_index, save_index, IndexManifest};
use crate::core::config::RetrievalSettings;
use crate::core::errors::RagError;

/// Query interface returning the most similar chunks for a text query.
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn retrieve(&self, query: &str) -> Result<Vec<Document>, RagError>;
}

pub struct VectorStore {
    embedder: Arc<dyn Embedder>,
    top_k: usize,
    score_threshold: Option<f32>,
    index: RwLock<Option<Arc<FlatIndex>>>,
}

impl VectorStore {
    pub fn new(embedder: Arc<dyn Embedder>, top_k: usize) -> Self {
        Self {
            embedder,
            top_k: top_k.max(1),
            score_threshold: None,
            index: RwLock::new(None),
        }
    }

    pub fn from_config(embedder: Arc<dyn Embedder>, settings: &RetrievalSettings) -> Self {
        Self::new(embedder, settings.top_k).with_score_threshold(settings.score_threshold)
    }

    pub fn with_score_threshold(mut self, threshold: Option<f32>) -> Self {
        self.score_threshold = threshold;
        self
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    fn current(&self) -> Result<Option<Arc<FlatIndex>>, RagError> {
        self.index
            .read()
            .map(|guard| guard.clone())
            .map_err(|_| RagError::Internal("vector index lock poisoned".to_string()))
    }

    fn replace(&self, index: FlatIndex) -> Result<(), RagError> {
        let mut guard = self
            .index
            .write()
            .map_err(|_| RagError::Internal("vector index lock poisoned".to_string()))?;
        *guard = Some(Arc::new(index));
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        matches!(self.current(), Ok(Some(_)))
    }

    /// Number of indexed chunks; zero before `build`/`load`.
    pub fn len(&self) -> usize {
        match self.current() {
            Ok(Some(index)) => index.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Embeds `documents` and swaps in a fresh index, dropping the previous one.
    pub async fn build(&self, documents: Vec<Document>) -> Result<(), RagError> {
        let texts: Vec<String> = documents.iter().map(|d| d.content.clone()).collect();
        let embeddings = if texts.is_empty() {
            Vec::new()
        } else {
            self.embedder.embed_documents(&texts).await?
        };

        if embeddings.len() != documents.len() {
            return Err(RagError::Llm(format!(
                "Embedding count mismatch: {} documents, {} vectors",
                documents.len(),
                embeddings.len()
            )));
        }

        let entries = documents
            .into_iter()
            .zip(embeddings)
            .map(|(document, embedding)| IndexEntry {
                document,
                embedding,
            })
            .collect::<Vec<_>>();
        let count = entries.len();

        self.replace(FlatIndex::new(entries))?;
        tracing::info!(
            "Vector store built with {} chunk(s) using {}",
            count,
            self.embedder.model_name()
        );
        Ok(())
    }

    pub fn get_retriever(&self) -> Result<VectorRetriever, RagError> {
        let index = self.current()?.ok_or_else(|| {
            RagError::NotInitialized("Vector store not initialized. Call build first".to_string())
        })?;

        Ok(VectorRetriever {
            embedder: self.embedder.clone(),
            index,
            top_k: self.top_k,
            score_threshold: self.score_threshold,
        })
    }

    pub async fn save(&self, path: &Path) -> Result<IndexManifest, RagError> {
        let index = self.current()?.ok_or_else(|| {
            RagError::NotInitialized("Vector store not initialized. Nothing to save".to_string())
        })?;
        save_index(path, &index, self.embedder.model_name()).await
    }

    pub async fn load(&self, path: &Path) -> Result<IndexManifest, RagError> {
        let (index, manifest) = load_index(path).await?;

        if !manifest.embedding_model.is_empty()
            && manifest.embedding_model != self.embedder.model_name()
        {
            tracing::warn!(
                "Index at {} was built with {}, querying with {}",
                path.display(),
                manifest.embedding_model,
                self.embedder.model_name()
            );
        }

        self.replace(index)?;
        tracing::info!(
            "Vector store loaded {} chunk(s) from {}",
            manifest.chunk_count,
            path.display()
        );
        Ok(manifest)
    }
}

/// Snapshot retriever over the index that existed when it was created.
#[derive(Clone)]
pub struct VectorRetriever {
    embedder: Arc<dyn Embedder>,
    index: Arc<FlatIndex>,
    top_k: usize,
    score_threshold: Option<f32>,
}

impl VectorRetriever {
    pub async fn retrieve_scored(&self, query: &str) -> Result<Vec<ScoredDocument>, RagError> {
        if self.index.is_empty() {
            return Ok(Vec::new());
        }
        let query_vec = self.embedder.embed_query(query).await?;
        if query_vec.len() != self.index.dimensions() {
            return Err(RagError::Llm(format!(
                "query embedding from {} has {} dimensions, index has {}",
                self.embedder.model_name(),
                query_vec.len(),
                self.index.dimensions()
            )));
        }
        Ok(self.index.search(&query_vec, self.top_k, self.score_threshold))
    }
}

#[async_trait]
impl Retriever for VectorRetriever {
    async fn retrieve(&self, query: &str) -> Result<Vec<Document>, RagError> {
        let scored = self.retrieve_scored(query).await?;
        tracing::debug!("Retrieved {} chunk(s) for query", scored.len());
        Ok(scored.into_iter().map(|s| s.document).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Letter-frequency vectors, enough to make similar strings close.
    struct LetterEmbedder;

    #[async_trait]
    impl Embedder for LetterEmbedder {
        fn model_name(&self) -> &str {
            "letters"
        }

        async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
            Ok(texts
                .iter()
                .map(|text| {
                    let mut v = vec![0.0f32; 26];
                    for c in text.to_ascii_lowercase().chars() {
                        if c.is_ascii_lowercase() {
                            v[(c as u8 - b'a') as usize] += 1.0;
                        }
                    }
                    v
                })
                .collect())
        }
    }

    /// Two-dimensional vectors, for loading an index built by another model.
    struct PairEmbedder;

    #[async_trait]
    impl Embedder for PairEmbedder {
        fn model_name(&self) -> &str {
            "pairs"
        }

        async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
            Ok(texts.iter().map(|t| vec![t.len() as f32, 1.0]).collect())
        }
    }

    fn store() -> VectorStore {
        VectorStore::new(Arc::new(LetterEmbedder), 2)
    }

    #[test]
    fn retriever_before_build_is_an_error() {
        let err = store().get_retriever().err().unwrap();
        assert!(matches!(err, RagError::NotInitialized(_)));
        assert!(err.to_string().contains("Call build first"));
    }

    #[tokio::test]
    async fn build_then_retrieve_top_k() {
        let store = store();
        store
            .build(vec![
                Document::new("aaaa", "a"),
                Document::new("bbbb", "b"),
                Document::new("aaab", "ab"),
            ])
            .await
            .unwrap();

        let docs = store.get_retriever().unwrap().retrieve("aaaa").await.unwrap();

        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].source(), "a");
        assert_eq!(docs[1].source(), "ab");
    }

    #[tokio::test]
    async fn rebuild_replaces_previous_index() {
        let store = store();
        store.build(vec![Document::new("aaaa", "old")]).await.unwrap();
        store.build(vec![Document::new("zzzz", "new")]).await.unwrap();

        assert_eq!(store.len(), 1);
        let docs = store.get_retriever().unwrap().retrieve("aaaa").await.unwrap();
        assert_eq!(docs[0].source(), "new");
    }

    #[tokio::test]
    async fn empty_build_retrieves_nothing() {
        let store = store();
        store.build(Vec::new()).await.unwrap();
        let docs = store.get_retriever().unwrap().retrieve("anything").await.unwrap();
        assert!(docs.is_empty());
    }

    #[tokio::test]
    async fn save_requires_an_index() {
        let tmp = tempfile::tempdir().unwrap();
        let err = store().save(tmp.path()).await.unwrap_err();
        assert!(matches!(err, RagError::NotInitialized(_)));
    }

    #[tokio::test]
    async fn index_from_another_embedding_model_is_rejected_at_query_time() {
        let tmp = tempfile::tempdir().unwrap();
        let built = store();
        built
            .build(vec![
                Document::new("unrelated one", "one"),
                Document::new("unrelated two", "two"),
            ])
            .await
            .unwrap();
        built.save(tmp.path()).await.unwrap();

        let other = VectorStore::new(Arc::new(PairEmbedder), 2);
        let manifest = other.load(tmp.path()).await.unwrap();
        assert_eq!(manifest.dimensions, 26);

        let err = other
            .get_retriever()
            .unwrap()
            .retrieve_scored("q")
            .await
            .unwrap_err();
        assert!(matches!(err, RagError::Llm(_)));
        assert!(err.to_string().contains("has 2 dimensions, index has 26"));
    }
}
