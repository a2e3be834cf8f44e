//! Web search through the DuckDuckGo instant-answer API
//!
//! Search problems never fail the tool: they are reported to the model as
//! fixed sentinel strings.

use super::{arguments, ToolHandler};
use revagent_core::{LlmProvider, ToolCall, ToolDefinition};
use revagent_error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Tool name the model calls
pub const WEBSEARCH: &str = "websearch";

pub const NO_RESULTS: &str = "No results found.";
pub const RATE_LIMITED: &str = "RatelimitException: Please try again after a short delay.";

const DEFAULT_BASE_URL: &str = "https://api.duckduckgo.com";

/// One hit, shaped like a text search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub href: String,
    pub body: String,
}

#[derive(Debug)]
pub enum SearchError {
    RateLimited,
    /// The search service answered with an error or could not be reached
    Service(String),
    Other(String),
}

/// Turn a search outcome into the text handed to the model
pub fn render_outcome(outcome: std::result::Result<Vec<SearchResult>, SearchError>) -> String {
    match outcome {
        Ok(results) if results.is_empty() => NO_RESULTS.to_string(),
        Ok(results) => serde_json::to_string(&results).unwrap_or_else(|e| format!("Exception: {}", e)),
        Err(SearchError::RateLimited) => RATE_LIMITED.to_string(),
        Err(SearchError::Service(msg)) => format!("DuckDuckGoSearchException: {}", msg),
        Err(SearchError::Other(msg)) => format!("Exception: {}", msg),
    }
}

#[derive(Debug, Deserialize)]
struct SearchArgs {
    keywords: String,
    #[serde(default)]
    region: Option<String>,
    #[serde(default)]
    max_results: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InstantAnswer {
    #[serde(default)]
    heading: String,
    #[serde(default)]
    abstract_text: String,
    #[serde(rename = "AbstractURL", default)]
    abstract_url: String,
    #[serde(default)]
    results: Vec<Topic>,
    #[serde(default)]
    related_topics: Vec<Topic>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Topic {
    Entry {
        #[serde(rename = "Text")]
        text: String,
        #[serde(rename = "FirstURL")]
        first_url: String,
    },
    Group {
        #[serde(rename = "Topics")]
        topics: Vec<Topic>,
    },
}

fn collect(topics: Vec<Topic>, out: &mut Vec<SearchResult>) {
    for topic in topics {
        match topic {
            Topic::Entry { text, first_url } => {
                let title = text.split(" - ").next().unwrap_or(&text).to_string();
                out.push(SearchResult {
                    title,
                    href: first_url,
                    body: text,
                });
            }
            Topic::Group { topics } => collect(topics, out),
        }
    }
}

impl InstantAnswer {
    fn into_results(self, max_results: Option<usize>) -> Vec<SearchResult> {
        let mut out = Vec::new();
        if !self.abstract_text.is_empty() {
            out.push(SearchResult {
                title: self.heading,
                href: self.abstract_url,
                body: self.abstract_text,
            });
        }
        collect(self.results, &mut out);
        collect(self.related_topics, &mut out);
        if let Some(max) = max_results {
            out.truncate(max);
        }
        out
    }
}

/// `websearch` tool
pub struct WebSearch {
    client: reqwest::Client,
    base_url: String,
    default_region: String,
}

impl WebSearch {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            default_region: "us-en".into(),
        }
    }

    pub async fn search(
        &self,
        keywords: &str,
        region: &str,
        max_results: Option<usize>,
    ) -> std::result::Result<Vec<SearchResult>, SearchError> {
        let response = self
            .client
            .get(format!("{}/", self.base_url.trim_end_matches('/')))
            .query(&[
                ("q", keywords),
                ("kl", region),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .timeout(std::time::Duration::from_secs(30))
            .send()
            .await
            .map_err(|e| SearchError::Service(e.to_string()))?;

        let status = response.status();
        // DuckDuckGo signals throttling with 202 as well as 429
        if status.as_u16() == 429 || status.as_u16() == 202 {
            return Err(SearchError::RateLimited);
        }
        if !status.is_success() {
            return Err(SearchError::Service(format!("HTTP {}", status)));
        }

        let answer: InstantAnswer = response
            .json()
            .await
            .map_err(|e| SearchError::Other(e.to_string()))?;
        Ok(answer.into_results(max_results))
    }
}

impl Default for WebSearch {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolHandler for WebSearch {
    fn definitions(&self) -> Vec<ToolDefinition> {
        vec![ToolDefinition::new(WEBSEARCH, "Search the web to get updated information.")
            .with_parameters(serde_json::json!({
                "type": "object",
                "properties": {
                    "keywords": { "type": "string", "description": "The search query keywords." },
                    "region": { "type": "string", "description": "The search region: wt-wt, us-en, uk-en, ru-ru, etc.." },
                    "max_results": { "type": "integer", "description": "The maximum number of results to return." }
                },
                "required": ["keywords"]
            }))]
    }

    async fn call<P: LlmProvider>(&self, _provider: &P, call: &ToolCall) -> Result<String> {
        if call.name != WEBSEARCH {
            return Err(Error::tool_unknown(call.name.as_str()));
        }
        let args: SearchArgs = arguments(call)?;
        let region = args.region.as_deref().unwrap_or(&self.default_region);
        let outcome = self.search(&args.keywords, region, args.max_results).await;
        if let Err(e) = &outcome {
            tracing::warn!(keywords = %args.keywords, error = ?e, "web search failed");
        }
        Ok(render_outcome(outcome))
    }
}
