use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::provider::LlmProvider;
use super::types::ChatRequest;
use crate::core::errors::RagError;

/// OpenAI-compatible HTTP provider (`/chat/completions`, `/embeddings`).
#[derive(Clone)]
pub struct OpenAiProvider {
    base_url: String,
    api_key: String,
    client: Client,
}

impl OpenAiProvider {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client: Client::new(),
        }
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<Value, RagError> {
        let url = format!("{}{}", self.base_url, path);
        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(RagError::llm)?;

        let status = res.status();
        if !status.is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(RagError::Llm(format!(
                "{} returned {}: {}",
                path, status, text
            )));
        }

        res.json().await.map_err(RagError::llm)
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn chat(&self, request: ChatRequest, model_id: &str) -> Result<String, RagError> {
        let mut body = json!({
            "model": model_id,
            "messages": request.messages,
            "stream": false,
        });

        if let Some(obj) = body.as_object_mut() {
            if let Some(t) = request.temperature {
                obj.insert("temperature".to_string(), json!(t));
            }
            if let Some(t) = request.max_tokens {
                obj.insert("max_tokens".to_string(), json!(t));
            }
            if let Some(s) = request.stop {
                obj.insert("stop".to_string(), json!(s));
            }
        }

        let payload = self.post_json("/chat/completions", &body).await?;
        parse_chat_content(&payload)
    }

    async fn embed(&self, inputs: &[String], model_id: &str) -> Result<Vec<Vec<f32>>, RagError> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let body = json!({
            "model": model_id,
            "input": inputs,
        });

        let payload = self.post_json("/embeddings", &body).await?;
        let embeddings = parse_embeddings(&payload)?;

        if embeddings.len() != inputs.len() {
            return Err(RagError::Llm(format!(
                "expected {} embeddings, got {}",
                inputs.len(),
                embeddings.len()
            )));
        }
        Ok(embeddings)
    }
}

fn parse_chat_content(payload: &Value) -> Result<String, RagError> {
    let message = payload["choices"]
        .get(0)
        .map(|choice| &choice["message"])
        .ok_or_else(|| RagError::Llm("chat response has no choices".to_string()))?;

    Ok(message["content"].as_str().unwrap_or_default().to_string())
}

/// Embeddings come back tagged with `index`; restore input order.
fn parse_embeddings(payload: &Value) -> Result<Vec<Vec<f32>>, RagError> {
    let data = payload["data"]
        .as_array()
        .ok_or_else(|| RagError::Llm("embedding response has no data".to_string()))?;

    let mut indexed: Vec<(usize, Vec<f32>)> = data
        .iter()
        .enumerate()
        .map(|(position, item)| {
            let index = item["index"].as_u64().map(|i| i as usize).unwrap_or(position);
            let vector = item["embedding"]
                .as_array()
                .map(|vals| {
                    vals.iter()
                        .filter_map(|v| v.as_f64().map(|f| f as f32))
                        .collect()
                })
                .unwrap_or_default();
            (index, vector)
        })
        .collect();

    indexed.sort_by_key(|(index, _)| *index);
    Ok(indexed.into_iter().map(|(_, vector)| vector).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_content_is_read_from_first_choice() {
        let payload = json!({
            "choices": [{ "message": { "role": "assistant", "content": "  Paris.  " } }]
        });
        assert_eq!(parse_chat_content(&payload).unwrap(), "  Paris.  ");

        let tool_only = json!({ "choices": [{ "message": { "content": null } }] });
        assert_eq!(parse_chat_content(&tool_only).unwrap(), "");

        assert!(parse_chat_content(&json!({ "choices": [] })).is_err());
    }

    #[test]
    fn embeddings_are_reordered_by_index() {
        let payload = json!({
            "data": [
                { "index": 1, "embedding": [0.0, 1.0] },
                { "index": 0, "embedding": [1.0, 0.0] }
            ]
        });
        let vectors = parse_embeddings(&payload).unwrap();
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let provider = OpenAiProvider::new("http://localhost:1234/v1/".to_string(), "k".to_string());
        assert_eq!(provider.base_url, "http://localhost:1234/v1");
        assert_eq!(provider.name(), "openai");
    }
}
