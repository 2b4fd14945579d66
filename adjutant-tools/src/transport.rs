//! Transports carrying tool calls: a stdio subprocess speaking the line
//! protocol, or direct in-process dispatch against the registry.

use std::process::Stdio;

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::client::Transport;
use crate::error::ToolError;
use crate::protocol::{self, WireRequest, WireResponse};
use crate::registry::ToolRegistry;

struct StdioLink {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    next_id: u64,
}

impl StdioLink {
    async fn roundtrip(&mut self, method: &str, params: Value) -> Result<Value, ToolError> {
        self.next_id += 1;
        let req = WireRequest::new(self.next_id, method, params);
        let mut line = serde_json::to_string(&req)
            .map_err(|e| ToolError::Connection(format!("encode request: {e}")))?;
        line.push('\n');

        self.stdin
            .write_all(line.as_bytes())
            .await
            .map_err(|e| ToolError::Connection(format!("write to tool server: {e}")))?;
        self.stdin
            .flush()
            .await
            .map_err(|e| ToolError::Connection(format!("flush to tool server: {e}")))?;

        let mut buf = String::new();
        let n = self
            .stdout
            .read_line(&mut buf)
            .await
            .map_err(|e| ToolError::Connection(format!("read from tool server: {e}")))?;
        if n == 0 {
            return Err(ToolError::Connection(
                "tool server closed the pipe".to_string(),
            ));
        }

        let resp: WireResponse = serde_json::from_str(buf.trim())
            .map_err(|e| ToolError::Server(format!("bad response line: {e}")))?;
        resp.into_result()
    }
}

async fn spawn_link(command: &str) -> Result<StdioLink, ToolError> {
    let mut parts = command.split_whitespace();
    let program = parts
        .next()
        .ok_or_else(|| ToolError::Connection("empty tool server command".to_string()))?;

    let mut child = Command::new(program)
        .args(parts)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .map_err(|e| ToolError::Connection(format!("spawn '{command}': {e}")))?;

    let stdin = child
        .stdin
        .take()
        .ok_or_else(|| ToolError::Connection("tool server stdin unavailable".to_string()))?;
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| ToolError::Connection("tool server stdout unavailable".to_string()))?;

    let mut link = StdioLink {
        child,
        stdin,
        stdout: BufReader::new(stdout),
        next_id: 0,
    };

    link.roundtrip(
        protocol::METHOD_INITIALIZE,
        serde_json::json!({
            "clientInfo": {"name": "adjutant", "version": env!("CARGO_PKG_VERSION")},
        }),
    )
    .await?;

    info!(command, "tool server spawned and initialized");
    Ok(link)
}

/// Spawns the configured server command and speaks the line protocol over its
/// stdio. A broken pipe drops the link so the next call respawns.
pub struct StdioTransport {
    command: String,
    inner: Mutex<Option<StdioLink>>,
}

impl StdioTransport {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            inner: Mutex::new(None),
        }
    }

    /// Kill the child process, if one is running.
    pub async fn shutdown(&self) {
        if let Some(mut link) = self.inner.lock().await.take() {
            debug!("shutting down tool server child");
            let _ = link.child.kill().await;
        }
    }
}

impl Transport for StdioTransport {
    async fn call(&self, operation: &str, arguments: &Value) -> Result<Value, ToolError> {
        let mut guard = self.inner.lock().await;
        if guard.is_none() {
            *guard = Some(spawn_link(&self.command).await?);
        }
        let Some(link) = guard.as_mut() else {
            return Err(ToolError::Connection("no tool server link".to_string()));
        };

        let result = link
            .roundtrip(
                protocol::METHOD_TOOLS_CALL,
                serde_json::json!({"name": operation, "arguments": arguments}),
            )
            .await;

        if matches!(result, Err(ToolError::Connection(_))) {
            // Broken pipe: drop the link so the next call respawns the server.
            *guard = None;
        }
        result
    }
}

/// In-process dispatch against the tool registry.
pub struct DirectTransport {
    registry: ToolRegistry,
}

impl DirectTransport {
    pub fn new(registry: ToolRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }
}

impl Transport for DirectTransport {
    async fn call(&self, operation: &str, arguments: &Value) -> Result<Value, ToolError> {
        self.registry.dispatch(operation, arguments).await
    }
}

/// The configured transport; the config file toggles between variants.
pub enum ToolTransport {
    Stdio(StdioTransport),
    Direct(DirectTransport),
}

impl ToolTransport {
    pub async fn shutdown(&self) {
        if let ToolTransport::Stdio(t) = self {
            t.shutdown().await;
        }
    }
}

impl Transport for ToolTransport {
    async fn call(&self, operation: &str, arguments: &Value) -> Result<Value, ToolError> {
        match self {
            ToolTransport::Stdio(t) => t.call(operation, arguments).await,
            ToolTransport::Direct(t) => t.call(operation, arguments).await,
        }
    }
}
