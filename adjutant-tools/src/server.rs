//! Stdio line server: runs the tool registry behind the wire protocol.

use anyhow::{Context, Result};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info};

use crate::error::ToolError;
use crate::protocol::{self, WireRequest, WireResponse};
use crate::registry::ToolRegistry;

/// Serve requests from stdin until it closes. One JSON request per line, one
/// JSON response per line.
pub async fn serve_stdio(registry: ToolRegistry) -> Result<()> {
    let stdin = tokio::io::stdin();
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(stdin).lines();

    info!("tool server listening on stdio");
    while let Some(line) = lines.next_line().await.context("read request line")? {
        if line.trim().is_empty() {
            continue;
        }
        let response = handle_line(&registry, &line).await;
        let mut out = serde_json::to_string(&response).context("serialize response")?;
        out.push('\n');
        stdout
            .write_all(out.as_bytes())
            .await
            .context("write response")?;
        stdout.flush().await.context("flush response")?;
    }
    info!("stdin closed; tool server exiting");
    Ok(())
}

async fn handle_line(registry: &ToolRegistry, line: &str) -> WireResponse {
    let req: WireRequest = match serde_json::from_str(line) {
        Ok(r) => r,
        Err(e) => {
            return WireResponse::err(
                0,
                &ToolError::InvalidArguments(format!("bad request line: {e}")),
            );
        }
    };

    match req.method.as_str() {
        protocol::METHOD_INITIALIZE => WireResponse::ok(
            req.id,
            serde_json::json!({
                "server": "adjutant-tools",
                "version": env!("CARGO_PKG_VERSION"),
            }),
        ),
        protocol::METHOD_TOOLS_CALL => {
            let name = req
                .params
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            if name.is_empty() {
                return WireResponse::err(
                    req.id,
                    &ToolError::InvalidArguments("missing tool name".to_string()),
                );
            }
            let arguments = req.params.get("arguments").cloned().unwrap_or(Value::Null);
            match registry.dispatch(&name, &arguments).await {
                Ok(result) => WireResponse::ok(req.id, result),
                Err(e) => {
                    error!(tool = %name, error = %e, "tool call failed");
                    WireResponse::err(req.id, &e)
                }
            }
        }
        other => WireResponse::err(req.id, &ToolError::UnknownOperation(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docs::{DocsClient, DocsConfig};

    fn registry() -> ToolRegistry {
        ToolRegistry::new(DocsClient::new(DocsConfig::default()).unwrap())
    }

    #[tokio::test]
    async fn initialize_handshake_acks() {
        let req = WireRequest::new(1, protocol::METHOD_INITIALIZE, serde_json::json!({}));
        let line = serde_json::to_string(&req).unwrap();
        let resp = handle_line(&registry(), &line).await;
        assert_eq!(resp.id, 1);
        assert!(resp.error.is_none());
        assert_eq!(resp.result.unwrap()["server"], "adjutant-tools");
    }

    #[tokio::test]
    async fn tool_call_without_name_is_invalid() {
        let req = WireRequest::new(2, protocol::METHOD_TOOLS_CALL, serde_json::json!({}));
        let line = serde_json::to_string(&req).unwrap();
        let resp = handle_line(&registry(), &line).await;
        assert_eq!(resp.error.unwrap().code, protocol::codes::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn unknown_method_maps_to_method_not_found() {
        let req = WireRequest::new(3, "tools/unknown", serde_json::json!({}));
        let line = serde_json::to_string(&req).unwrap();
        let resp = handle_line(&registry(), &line).await;
        assert_eq!(resp.error.unwrap().code, protocol::codes::METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn garbage_line_is_rejected_not_fatal() {
        let resp = handle_line(&registry(), "not json at all").await;
        assert_eq!(resp.error.unwrap().code, protocol::codes::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn create_event_roundtrips_through_the_wire() {
        let req = WireRequest::tool_call(
            4,
            "create_event",
            &serde_json::json!({
                "user_id": 1,
                "summary": "Sync",
                "start_iso": "2024-01-02T10:00:00Z",
                "end_iso": "2024-01-02T10:30:00Z",
                "caller": "personal",
            }),
        );
        let line = serde_json::to_string(&req).unwrap();
        let resp = handle_line(&registry(), &line).await;
        let result = resp.result.unwrap();
        assert!(result.as_str().unwrap().starts_with("event://1/"));
    }
}
