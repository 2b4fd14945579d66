//! Command-help specialist: cached answers first, then docs context plus an
//! LLM completion, post-formatted into a predictable shape.

use serde_json::{Value, json};
use tracing::warn;

use adjutant_tools::client::Transport;
use adjutant_tools::error::ToolError;
use adjutant_tools::registry::OP_SEARCH_DOCS;

use crate::llm;
use crate::specialist::{AgentContext, invoke_allowed};

const NAME: &str = "command";
const ALLOWED: &[&str] = &[OP_SEARCH_DOCS];

const PROMPT_TEMPLATE: &str = "You are a helpful assistant that explains commands and tools.\n\
- Always explain what the command does.\n\
- Show syntax in a code block.\n\
- Give a working example.\n\
- Be concise and beginner-friendly.\n\
User question: {query}\n\
Context (from docs if available): {context}\n";

pub struct CommandSpecialist;

impl CommandSpecialist {
    pub async fn act<T: Transport>(
        &self,
        query: &str,
        ctx: &AgentContext<'_, T>,
    ) -> Result<String, ToolError> {
        if let Some(answer) = ctx.cache.lookup(query) {
            return Ok(answer.to_string());
        }

        let (context_text, sources) = match invoke_allowed(
            ctx.client,
            NAME,
            ALLOWED,
            OP_SEARCH_DOCS,
            json!({"query": query}),
        )
        .await?
        {
            // Dry-run hands back the description line instead of a payload.
            Value::String(line) => return Ok(line),
            value => {
                let content = value
                    .get("content")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                let sources: Vec<String> = value
                    .get("sources")
                    .and_then(Value::as_array)
                    .map(|a| {
                        a.iter()
                            .filter_map(Value::as_str)
                            .take(3)
                            .map(str::to_string)
                            .collect()
                    })
                    .unwrap_or_default();
                (content, sources)
            }
        };

        let prompt = PROMPT_TEMPLATE
            .replace("{query}", query)
            .replace("{context}", &context_text);

        let answer = match llm::generate(ctx.llm, &prompt).await {
            Ok(text) if !text.is_empty() => ensure_sections(&text),
            Ok(_) => llm::offline_hint(ctx.llm),
            Err(e) => {
                warn!(error = %e, "llm completion failed; answering with a hint");
                llm::offline_hint(ctx.llm)
            }
        };

        if sources.is_empty() {
            Ok(answer)
        } else {
            Ok(format!("{answer}\n\nSources: {}", sources.join(", ")))
        }
    }
}

/// Guarantee the Explanation/Syntax/Example shape without duplicating
/// sections the model already produced.
pub fn ensure_sections(text: &str) -> String {
    let normalized = text.trim();
    let lower = normalized.to_lowercase();
    let has_explanation = lower.contains("explanation");
    let has_syntax = lower.contains("syntax") || normalized.contains("```");
    let has_example = lower.contains("example") || normalized.contains("```");

    let mut parts = Vec::new();
    if has_explanation {
        parts.push(normalized.to_string());
    } else {
        parts.push(format!("Explanation:\n{normalized}"));
    }
    if !has_syntax {
        parts.push("Syntax:\n```\n<fill based on command>\n```".to_string());
    }
    if !has_example {
        parts.push("Example:\n```\n<example>\n```".to_string());
    }
    parts.join("\n\n")
}
