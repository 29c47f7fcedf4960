//! Agentic retrieval-augmented question answering.
//!
//! Documents from URLs, PDF directories and text files are split, embedded
//! and indexed; questions are answered from the retrieved chunks, with a
//! Wikipedia-using agent as the fallback when retrieval finds nothing.

pub mod agent;
pub mod core;
pub mod graph;
pub mod llm;
pub mod rag;
pub mod state;
pub mod tools;

pub use crate::core::errors::RagError;
pub use crate::state::AppState;
