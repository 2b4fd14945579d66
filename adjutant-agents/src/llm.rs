//! LLM completion client (Ollama-style generate endpoint).

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "mistral-nemo".to_string(),
        }
    }
}

/// Run one non-streaming completion.
pub async fn generate(config: &LlmConfig, prompt: &str) -> Result<String> {
    #[derive(Serialize)]
    struct Req<'a> {
        model: &'a str,
        prompt: &'a str,
        stream: bool,
    }

    #[derive(Deserialize)]
    struct Resp {
        response: Option<String>,
    }

    let body = Req {
        model: &config.model,
        prompt,
        stream: false,
    };

    let client = reqwest::Client::new();
    let resp = client
        .post(format!(
            "{}/api/generate",
            config.base_url.trim_end_matches('/')
        ))
        .json(&body)
        .send()
        .await
        .context("llm request")?;

    let status = resp.status();
    if !status.is_success() {
        bail!("llm error: {status}");
    }

    let out: Resp = resp.json().await.context("parse llm response")?;
    Ok(out.response.unwrap_or_default().trim().to_string())
}

/// Friendly guidance when the local model is unreachable.
pub fn offline_hint(config: &LlmConfig) -> String {
    format!(
        "The local LLM is unavailable. Install Ollama and run: ollama pull {model} && ollama run {model}",
        model = config.model
    )
}
