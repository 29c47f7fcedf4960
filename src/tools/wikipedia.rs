use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::KnowledgeTool;
use crate::core::config::AgentSettings;
use crate::core::errors::RagError;

pub const NO_RESULT: &str = "No good Wikipedia Search Result was found";

#[derive(Debug, Clone, PartialEq)]
pub struct WikipediaHit {
    pub page_id: u64,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WikipediaPage {
    pub title: String,
    pub summary: String,
}

/// Encyclopedia keyword search over the MediaWiki API.
pub struct WikipediaSearch {
    client: reqwest::Client,
    api_url: String,
    top_k: usize,
    max_chars: usize,
}

impl WikipediaSearch {
    pub fn new(lang: &str, top_k: usize, max_chars: usize) -> Result<Self, RagError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("agentic-rag/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| RagError::Tool(format!("failed to build HTTP client: {}", err)))?;
        Ok(Self {
            client,
            api_url: format!("https://{}.wikipedia.org/w/api.php", lang.trim()),
            top_k: top_k.max(1),
            max_chars,
        })
    }

    pub fn from_config(settings: &AgentSettings) -> Result<Self, RagError> {
        Self::new(
            &settings.wikipedia_lang,
            settings.wikipedia_top_k,
            settings.wikipedia_max_chars,
        )
    }

    /// Points the tool at another MediaWiki endpoint.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    async fn get_json(&self, query: &str) -> Result<Value, RagError> {
        let url = format!("{}?{}", self.api_url, query);
        let response = self.client.get(&url).send().await.map_err(RagError::tool)?;
        if !response.status().is_success() {
            return Err(RagError::Tool(format!(
                "Wikipedia returned {}",
                response.status()
            )));
        }
        response.json::<Value>().await.map_err(RagError::tool)
    }

    pub async fn search(&self, query: &str) -> Result<Vec<WikipediaHit>, RagError> {
        let body = self
            .get_json(&format!(
                "action=query&list=search&format=json&srlimit={}&srsearch={}",
                self.top_k,
                urlencoding::encode(query)
            ))
            .await?;
        Ok(parse_search_hits(&body))
    }

    pub async fn summaries(&self, hits: &[WikipediaHit]) -> Result<Vec<WikipediaPage>, RagError> {
        if hits.is_empty() {
            return Ok(Vec::new());
        }
        let ids = hits
            .iter()
            .map(|hit| hit.page_id.to_string())
            .collect::<Vec<_>>()
            .join("|");
        let body = self
            .get_json(&format!(
                "action=query&prop=extracts&exintro=1&explaintext=1&redirects=1&format=json&pageids={}",
                urlencoding::encode(&ids)
            ))
            .await?;
        Ok(parse_extracts(&body, hits))
    }
}

#[async_trait]
impl KnowledgeTool for WikipediaSearch {
    fn name(&self) -> &str {
        "wikipedia"
    }

    fn description(&self) -> &str {
        "Search Wikipedia for general knowledge. Input is a short keyword query; \
         returns page titles with their introductory summaries."
    }

    async fn run(&self, query: &str) -> Result<String, RagError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(RagError::BadRequest("Search query missing".to_string()));
        }

        let hits = self.search(query).await?;
        let pages = self.summaries(&hits).await?;
        tracing::info!("Wikipedia search '{}' returned {} page(s)", query, pages.len());

        Ok(format_pages(&pages, self.max_chars))
    }
}

pub fn parse_search_hits(body: &Value) -> Vec<WikipediaHit> {
    body.get("query")
        .and_then(|q| q.get("search"))
        .and_then(|s| s.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    Some(WikipediaHit {
                        page_id: item.get("pageid")?.as_u64()?,
                        title: item.get("title")?.as_str()?.to_string(),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Extracts come back keyed by page id; they are returned in search order.
pub fn parse_extracts(body: &Value, hits: &[WikipediaHit]) -> Vec<WikipediaPage> {
    let Some(pages) = body
        .get("query")
        .and_then(|q| q.get("pages"))
        .and_then(|p| p.as_object())
    else {
        return Vec::new();
    };

    hits.iter()
        .filter_map(|hit| {
            let page = pages.get(&hit.page_id.to_string())?;
            let summary = page.get("extract")?.as_str()?.trim();
            if summary.is_empty() {
                return None;
            }
            let title = page
                .get("title")
                .and_then(|t| t.as_str())
                .unwrap_or(&hit.title)
                .to_string();
            Some(WikipediaPage {
                title,
                summary: summary.to_string(),
            })
        })
        .collect()
}

pub fn format_pages(pages: &[WikipediaPage], max_chars: usize) -> String {
    if pages.is_empty() {
        return NO_RESULT.to_string();
    }

    let joined = pages
        .iter()
        .map(|page| format!("Page: {}\nSummary: {}", page.title, page.summary))
        .collect::<Vec<_>>()
        .join("\n\n");

    if max_chars == 0 {
        return joined;
    }
    joined.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn hits() -> Vec<WikipediaHit> {
        vec![
            WikipediaHit {
                page_id: 42,
                title: "Retrieval-augmented generation".to_string(),
            },
            WikipediaHit {
                page_id: 7,
                title: "Large language model".to_string(),
            },
        ]
    }

    #[test]
    fn parses_search_results_in_rank_order() {
        let body = json!({
            "query": {
                "search": [
                    {"ns": 0, "title": "Retrieval-augmented generation", "pageid": 42},
                    {"ns": 0, "title": "Large language model", "pageid": 7},
                    {"ns": 0, "title": "broken"}
                ]
            }
        });

        assert_eq!(parse_search_hits(&body), hits());
        assert!(parse_search_hits(&json!({"batchcomplete": ""})).is_empty());
    }

    #[test]
    fn extracts_follow_search_order_and_skip_empty_pages() {
        let body = json!({
            "query": {
                "pages": {
                    "7": {"pageid": 7, "title": "Large language model", "extract": "An LLM is a model."},
                    "42": {"pageid": 42, "title": "Retrieval-augmented generation", "extract": "  RAG adds retrieval.  "}
                }
            }
        });

        let pages = parse_extracts(&body, &hits());
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].title, "Retrieval-augmented generation");
        assert_eq!(pages[0].summary, "RAG adds retrieval.");

        let sparse = json!({"query": {"pages": {"7": {"pageid": 7, "title": "Large language model", "extract": ""}}}});
        assert!(parse_extracts(&sparse, &hits()).is_empty());
    }

    #[test]
    fn formatting_caps_length_and_reports_no_result() {
        let pages = vec![
            WikipediaPage {
                title: "A".to_string(),
                summary: "first".to_string(),
            },
            WikipediaPage {
                title: "B".to_string(),
                summary: "second".to_string(),
            },
        ];

        assert_eq!(
            format_pages(&pages, 0),
            "Page: A\nSummary: first\n\nPage: B\nSummary: second"
        );
        assert_eq!(format_pages(&pages, 7), "Page: A");
        assert_eq!(format_pages(&[], 100), NO_RESULT);
    }

    #[test]
    fn client_settings_follow_configuration() {
        let tool = WikipediaSearch::new(" de ", 0, 300).unwrap();
        assert_eq!(tool.api_url, "https://de.wikipedia.org/w/api.php");
        assert_eq!(tool.top_k, 1);
        assert_eq!(tool.max_chars, 300);

        let local = tool.with_api_url("http://127.0.0.1:9/w/api.php");
        assert_eq!(local.api_url, "http://127.0.0.1:9/w/api.php");
    }
}
