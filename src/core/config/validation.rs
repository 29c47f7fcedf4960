use serde_json::{Map, Value};

use super::defaults;
use crate::core::errors::RagError;

pub fn validate_config(config: &Value) -> Result<(), RagError> {
    let root = config
        .as_object()
        .ok_or_else(|| config_type_error("root", "object"))?;

    if let Some(llm) = expect_optional_object(root, "llm")? {
        validate_optional_string_field(llm, "llm.model", "model")?;
        validate_optional_string_field(llm, "llm.base_url", "base_url")?;
        validate_optional_string_field(llm, "llm.api_key", "api_key")?;
        validate_f64_field(llm, "llm.temperature", "temperature", 0.0, 2.0)?;
        validate_u64_field(llm, "llm.max_tokens", "max_tokens", 1, 1_000_000)?;
    }

    if let Some(embedding) = expect_optional_object(root, "embedding")? {
        validate_optional_string_field(embedding, "embedding.model", "model")?;
        validate_u64_field(embedding, "embedding.batch_size", "batch_size", 1, 2048)?;
    }

    if let Some(ingestion) = expect_optional_object(root, "ingestion")? {
        validate_u64_field(ingestion, "ingestion.chunk_size", "chunk_size", 1, 1_000_000)?;
        validate_u64_field(
            ingestion,
            "ingestion.chunk_overlap",
            "chunk_overlap",
            0,
            1_000_000,
        )?;
        validate_u64_field(
            ingestion,
            "ingestion.web_timeout_secs",
            "web_timeout_secs",
            1,
            86_400,
        )?;
        validate_string_array_field(ingestion, "ingestion.default_sources", "default_sources")?;

        let chunk_size = ingestion
            .get("chunk_size")
            .and_then(|v| v.as_u64())
            .unwrap_or(defaults::CHUNK_SIZE as u64);
        let chunk_overlap = ingestion
            .get("chunk_overlap")
            .and_then(|v| v.as_u64())
            .unwrap_or(defaults::CHUNK_OVERLAP as u64);
        if chunk_overlap >= chunk_size {
            return Err(RagError::Config(format!(
                "Invalid config at 'ingestion.chunk_overlap': must be smaller than chunk_size ({})",
                chunk_size
            )));
        }
    }

    if let Some(retrieval) = expect_optional_object(root, "retrieval")? {
        validate_u64_field(retrieval, "retrieval.top_k", "top_k", 1, 1_000)?;
        validate_f64_field(
            retrieval,
            "retrieval.score_threshold",
            "score_threshold",
            -1.0,
            1.0,
        )?;
        validate_optional_string_field(retrieval, "retrieval.index_path", "index_path")?;
    }

    if let Some(answer) = expect_optional_object(root, "answer")? {
        validate_u64_field(answer, "answer.context_docs", "context_docs", 1, 100)?;
        validate_u64_field(
            answer,
            "answer.summarize_threshold",
            "summarize_threshold",
            0,
            1_000_000,
        )?;
    }

    if let Some(agent) = expect_optional_object(root, "agent")? {
        validate_u64_field(agent, "agent.max_steps", "max_steps", 1, 100)?;
        validate_optional_string_field(agent, "agent.wikipedia_lang", "wikipedia_lang")?;
        validate_u64_field(agent, "agent.wikipedia_top_k", "wikipedia_top_k", 1, 50)?;
        validate_u64_field(
            agent,
            "agent.wikipedia_max_chars",
            "wikipedia_max_chars",
            1,
            1_000_000,
        )?;
    }

    if let Some(graph) = expect_optional_object(root, "graph")? {
        validate_u64_field(graph, "graph.max_steps", "max_steps", 1, 10_000)?;
        if let Some(value) = graph.get("variant") {
            match value.as_str() {
                Some("agentic" | "simple") => {}
                Some(other) => {
                    return Err(RagError::Config(format!(
                        "Invalid config at 'graph.variant': unknown variant '{}' (expected 'agentic' or 'simple')",
                        other
                    )))
                }
                None => return Err(config_type_error("graph.variant", "string")),
            }
        }
    }

    Ok(())
}

fn expect_optional_object<'a>(
    root: &'a Map<String, Value>,
    key: &str,
) -> Result<Option<&'a Map<String, Value>>, RagError> {
    match root.get(key) {
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(Value::Null) | None => Ok(None),
        Some(_) => Err(config_type_error(key, "object")),
    }
}

fn validate_u64_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
    min: u64,
    max: u64,
) -> Result<(), RagError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    if value.is_null() {
        return Ok(());
    }
    let Some(number) = value.as_u64() else {
        return Err(config_type_error(path, "integer"));
    };
    if number < min || number > max {
        return Err(RagError::Config(format!(
            "Invalid config at '{}': must be between {} and {}",
            path, min, max
        )));
    }
    Ok(())
}

fn validate_f64_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
    min: f64,
    max: f64,
) -> Result<(), RagError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    if value.is_null() {
        return Ok(());
    }
    let Some(number) = value.as_f64() else {
        return Err(config_type_error(path, "number"));
    };
    if number < min || number > max {
        return Err(RagError::Config(format!(
            "Invalid config at '{}': must be between {} and {}",
            path, min, max
        )));
    }
    Ok(())
}

fn validate_optional_string_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), RagError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    if value.is_null() || value.as_str().is_some() {
        return Ok(());
    }
    Err(config_type_error(path, "string"))
}

fn validate_string_array_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), RagError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    let Some(items) = value.as_array() else {
        return Err(config_type_error(path, "array of strings"));
    };
    for (index, item) in items.iter().enumerate() {
        let Some(text) = item.as_str() else {
            return Err(config_type_error(&format!("{}[{}]", path, index), "string"));
        };
        if text.trim().is_empty() {
            return Err(RagError::Config(format!(
                "Invalid config at '{}[{}]': value cannot be empty",
                path, index
            )));
        }
    }
    Ok(())
}

fn config_type_error(path: &str, expected: &str) -> RagError {
    RagError::Config(format!(
        "Invalid config at '{}': expected {}",
        path, expected
    ))
}
