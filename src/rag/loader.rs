//! Document loading for URLs, PDF directories and text files.
//!
//! A bad source never aborts a batch: unsupported shapes and load failures
//! are logged and contribute no documents.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;

use super::document::Document;
use super::html::extract_page;
use super::splitter::TextSplitter;
use crate::core::config::IngestionSettings;
use crate::core::errors::RagError;

/// Shape of a source string, decided before anything is loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    Url(String),
    PdfDirectory(PathBuf),
    TextFile(PathBuf),
}

impl SourceKind {
    pub fn classify(source: &str) -> Option<Self> {
        let trimmed = source.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            return Some(SourceKind::Url(trimmed.to_string()));
        }

        let path = PathBuf::from(trimmed);
        if path.is_dir() {
            return Some(SourceKind::PdfDirectory(path));
        }
        if has_extension(&path, "txt") {
            return Some(SourceKind::TextFile(path));
        }
        None
    }
}

pub struct DocumentProcessor {
    splitter: TextSplitter,
    client: reqwest::Client,
}

impl DocumentProcessor {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, RagError> {
        Self::with_timeout(chunk_size, chunk_overlap, Duration::from_secs(30))
    }

    pub fn from_config(settings: &IngestionSettings) -> Result<Self, RagError> {
        Self::with_timeout(
            settings.chunk_size,
            settings.chunk_overlap,
            Duration::from_secs(settings.web_timeout_secs),
        )
    }

    fn with_timeout(
        chunk_size: usize,
        chunk_overlap: usize,
        timeout: Duration,
    ) -> Result<Self, RagError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("agentic-rag/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| RagError::Internal(format!("failed to build HTTP client: {}", err)))?;
        Ok(Self {
            splitter: TextSplitter::new(chunk_size, chunk_overlap),
            client,
        })
    }

    pub fn splitter(&self) -> &TextSplitter {
        &self.splitter
    }

    /// Fetches a web page and keeps its visible text.
    pub async fn load_url(&self, url: &str) -> Result<Vec<Document>, RagError> {
        let response = self.client.get(url).send().await.map_err(RagError::internal)?;
        if !response.status().is_success() {
            return Err(RagError::Internal(format!(
                "GET {} returned {}",
                url,
                response.status()
            )));
        }
        let html = response.text().await.map_err(RagError::internal)?;
        let page = extract_page(&html);

        Ok(vec![Document::new(page.text, url).with_title(page.title)])
    }

    /// One document per page for every PDF in `directory`.
    pub async fn load_pdf_dir(&self, directory: &Path) -> Result<Vec<Document>, RagError> {
        let mut pdfs = Vec::new();
        let mut entries = tokio::fs::read_dir(directory).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.is_file() && has_extension(&path, "pdf") {
                pdfs.push(path);
            }
        }
        pdfs.sort();

        let mut documents = Vec::new();
        for pdf in pdfs {
            let source = pdf.to_string_lossy().to_string();
            let path = pdf.clone();
            let extracted =
                tokio::task::spawn_blocking(move || pdf_extract::extract_text(&path)).await;

            match extracted {
                Ok(Ok(text)) => {
                    for (page, page_text) in split_pages(&text).into_iter().enumerate() {
                        documents.push(Document::new(page_text, source.clone()).with_page(page));
                    }
                }
                Ok(Err(err)) => {
                    tracing::warn!("Skipping unreadable PDF {}: {}", source, err);
                }
                Err(err) => {
                    tracing::warn!("PDF extraction aborted for {}: {}", source, err);
                }
            }
        }

        Ok(documents)
    }

    pub async fn load_text(&self, path: &Path) -> Result<Vec<Document>, RagError> {
        let text = tokio::fs::read_to_string(path).await?;
        Ok(vec![Document::new(text, path.to_string_lossy())])
    }

    pub async fn load_source(&self, kind: &SourceKind) -> Result<Vec<Document>, RagError> {
        match kind {
            SourceKind::Url(url) => self.load_url(url).await,
            SourceKind::PdfDirectory(dir) => self.load_pdf_dir(dir).await,
            SourceKind::TextFile(path) => self.load_text(path).await,
        }
    }

    /// Loads every source, skipping unsupported or failing ones.
    pub async fn load_documents(&self, sources: &[String]) -> Vec<Document> {
        let mut docs = Vec::new();

        for src in sources {
            let Some(kind) = SourceKind::classify(src) else {
                let err = RagError::UnsupportedSource(format!(
                    "{} (use a URL, a .txt file or a PDF directory)",
                    src
                ));
                tracing::warn!("{}", err);
                continue;
            };

            match self.load_source(&kind).await {
                Ok(loaded) => {
                    tracing::info!("Loaded {} document(s) from {}", loaded.len(), src);
                    docs.extend(loaded);
                }
                Err(err) => {
                    tracing::warn!("Failed to load {}: {}", src, err);
                }
            }
        }

        docs
    }

    pub fn split_documents(&self, documents: &[Document]) -> Vec<Document> {
        self.splitter.split_documents(documents)
    }

    /// Load then split.
    pub async fn process(&self, sources: &[String]) -> Vec<Document> {
        let docs = self.load_documents(sources).await;
        let chunks = self.split_documents(&docs);
        tracing::info!(
            "Processed {} source(s) into {} chunk(s)",
            sources.len(),
            chunks.len()
        );
        chunks
    }
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(ext))
        .unwrap_or(false)
}

fn blank_run() -> &'static Regex {
    static BLANK_RUN: OnceLock<Regex> = OnceLock::new();
    BLANK_RUN.get_or_init(|| Regex::new(r"\n[ \t]*(\n[ \t]*)+").expect("static pattern"))
}

/// pdf-extract separates pages with form feeds; blank pages are dropped and
/// runs of empty lines collapse to one paragraph break.
fn split_pages(text: &str) -> Vec<String> {
    text.split('\u{c}')
        .map(str::trim)
        .filter(|page| !page.is_empty())
        .map(|page| blank_run().replace_all(page, "\n\n").into_owned())
        .collect()
}
