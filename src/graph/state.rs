// Graph State
// Per-question record threaded through the nodes

use serde::{Deserialize, Serialize};

use crate::rag::Document;

/// State for one question/answer cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RagState {
    pub question: String,
    /// Chunks returned by retrieval, in rank order. Empty when nothing matched.
    #[serde(default)]
    pub retrieved_docs: Vec<Document>,
    /// Empty until an answer node has run.
    #[serde(default)]
    pub answer: String,
}

impl RagState {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            retrieved_docs: Vec::new(),
            answer: String::new(),
        }
    }

    pub fn has_answer(&self) -> bool {
        !self.answer.is_empty()
    }
}
