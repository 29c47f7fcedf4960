use thiserror::Error;

#[derive(Debug, Error)]
pub enum RagError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("not initialized: {0}")]
    NotInitialized(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("unsupported source: {0}")]
    UnsupportedSource(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("language model error: {0}")]
    Llm(String),
    #[error("tool error: {0}")]
    Tool(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl RagError {
    pub fn internal<E: std::fmt::Display>(err: E) -> Self {
        RagError::Internal(err.to_string())
    }

    pub fn llm<E: std::fmt::Display>(err: E) -> Self {
        RagError::Llm(err.to_string())
    }

    pub fn tool<E: std::fmt::Display>(err: E) -> Self {
        RagError::Tool(err.to_string())
    }
}

impl From<std::io::Error> for RagError {
    fn from(err: std::io::Error) -> Self {
        RagError::Internal(err.to_string())
    }
}

impl From<sqlx::Error> for RagError {
    fn from(err: sqlx::Error) -> Self {
        RagError::Internal(format!("index storage: {}", err))
    }
}
