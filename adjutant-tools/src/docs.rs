//! Docs-scraping client: fetches documentation context for a help query.
//!
//! Talks to a FireCrawl-style scrape API. A missing API key degrades to
//! empty context instead of failing, so the help path still works offline.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use crate::error::ToolError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocsConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.firecrawl.dev".to_string(),
            api_key: None,
            timeout_secs: 30,
        }
    }
}

pub struct DocsClient {
    http: reqwest::Client,
    config: DocsConfig,
}

impl DocsClient {
    pub fn new(config: DocsConfig) -> Result<Self, ToolError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ToolError::Connection(e.to_string()))?;
        Ok(Self { http, config })
    }

    /// Candidate documentation pages for the query's leading keyword.
    pub fn candidate_urls(query: &str) -> Vec<String> {
        let keyword = query
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_lowercase();
        if keyword.is_empty() {
            return Vec::new();
        }
        vec![
            format!("https://man7.org/linux/man-pages/man1/{keyword}.1.html"),
            format!("https://www.gnu.org/software/{keyword}/manual/"),
            format!("https://tldr.inbrowser.app/pages/common/{keyword}.md"),
        ]
    }

    /// Scrape candidate pages and join what succeeded. Individual scrape
    /// failures are skipped; a rejected API key propagates as Unauthorized.
    pub async fn fetch_context(&self, query: &str) -> Result<(String, Vec<String>), ToolError> {
        let Some(api_key) = self.config.api_key.clone() else {
            return Ok((String::new(), Vec::new()));
        };

        let mut texts = Vec::new();
        let mut sources = Vec::new();
        for url in Self::candidate_urls(query) {
            match self.scrape(&api_key, &url).await {
                Ok(Some(text)) => {
                    texts.push(text);
                    sources.push(url);
                }
                Ok(None) => {}
                Err(e @ ToolError::Unauthorized(_)) => return Err(e),
                Err(e) => {
                    warn!(url = %url, error = %e, "scrape failed; skipping source");
                }
            }
        }
        Ok((texts.join("\n\n"), sources))
    }

    async fn scrape(&self, api_key: &str, url: &str) -> Result<Option<String>, ToolError> {
        #[derive(Deserialize)]
        struct ScrapeResponse {
            data: Option<ScrapeData>,
        }

        #[derive(Deserialize)]
        struct ScrapeData {
            markdown: Option<String>,
            html: Option<String>,
        }

        let endpoint = format!("{}/v2/scrape", self.config.base_url.trim_end_matches('/'));
        let resp = self
            .http
            .post(&endpoint)
            .bearer_auth(api_key)
            .json(&json!({"url": url, "formats": ["markdown"]}))
            .send()
            .await
            .map_err(|e| ToolError::Connection(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ToolError::Unauthorized(
                "docs API rejected the configured key".to_string(),
            ));
        }
        if !status.is_success() {
            return Err(ToolError::Server(format!(
                "docs API returned {status} for {url}"
            )));
        }

        let body: ScrapeResponse = resp
            .json()
            .await
            .map_err(|e| ToolError::Server(format!("bad scrape payload: {e}")))?;
        let text = body.data.and_then(|d| d.markdown.or(d.html));
        Ok(text
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty()))
    }
}
