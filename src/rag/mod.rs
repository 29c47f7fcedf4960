//! Document ingestion and retrieval.
//!
//! Sources are loaded and split by [`DocumentProcessor`], embedded into a
//! [`VectorStore`], and queried through a [`Retriever`].

mod document;
mod embedding;
mod html;
mod index;
mod loader;
mod persist;
mod splitter;
mod store;

pub use document::{Document, DocumentMetadata};
pub use embedding::{Embedder, ProviderEmbedder};
pub use html::{extract_page, ExtractedPage};
pub use index::{cosine_similarity, FlatIndex, IndexEntry, ScoredDocument};
pub use loader::{DocumentProcessor, SourceKind};
pub use persist::{load_index, save_index, IndexManifest, INDEX_FILE};
pub use splitter::TextSplitter;
pub use store::{Retriever, VectorRetriever, VectorStore};
