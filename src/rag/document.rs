use serde::{Deserialize, Serialize};

/// Where a piece of text came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Origin identifier (URL or file path).
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// 0-based page for paged sources such as PDFs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
    /// Character offset of a chunk inside its parent document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_index: Option<usize>,
}

/// A unit of text plus its source metadata. Loaders emit whole documents,
/// the splitter derives new chunk documents from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub content: String,
    pub metadata: DocumentMetadata,
}

impl Document {
    pub fn new(content: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: DocumentMetadata {
                source: source.into(),
                ..Default::default()
            },
        }
    }

    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.metadata.title = title;
        self
    }

    pub fn with_page(mut self, page: usize) -> Self {
        self.metadata.page = Some(page);
        self
    }

    pub fn source(&self) -> &str {
        &self.metadata.source
    }

    /// Builds the chunk at `start_index` of this document; metadata is inherited.
    pub(crate) fn derive_chunk(&self, content: String, start_index: usize, chunk_index: usize) -> Self {
        Self {
            content,
            metadata: DocumentMetadata {
                start_index: Some(start_index),
                chunk_index: Some(chunk_index),
                ..self.metadata.clone()
            },
        }
    }
}
