//! JSON-RPC 2.0 line protocol between the bot and the tool server.
//!
//! One request per line, one response per line. `initialize` handshakes,
//! `tools/call` invokes a named operation with an arguments object.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ToolError;

pub const JSONRPC_VERSION: &str = "2.0";
pub const METHOD_INITIALIZE: &str = "initialize";
pub const METHOD_TOOLS_CALL: &str = "tools/call";

pub mod codes {
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL: i64 = -32603;
    pub const UNAUTHORIZED: i64 = -32001;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireRequest {
    pub jsonrpc: String,
    pub id: u64,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

impl WireRequest {
    pub fn new(id: u64, method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            method: method.into(),
            params,
        }
    }

    pub fn tool_call(id: u64, name: &str, arguments: &Value) -> Self {
        Self::new(
            id,
            METHOD_TOOLS_CALL,
            serde_json::json!({"name": name, "arguments": arguments}),
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireError {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireResponse {
    pub jsonrpc: String,
    pub id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<WireError>,
}

impl WireResponse {
    pub fn ok(id: u64, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn err(id: u64, error: &ToolError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(WireError {
                code: error_code(error),
                message: error.to_string(),
            }),
        }
    }

    pub fn into_result(self) -> Result<Value, ToolError> {
        if let Some(e) = self.error {
            return Err(error_from_wire(e.code, e.message));
        }
        Ok(self.result.unwrap_or(Value::Null))
    }
}

pub fn error_code(err: &ToolError) -> i64 {
    match err {
        ToolError::InvalidArguments(_) => codes::INVALID_PARAMS,
        ToolError::Unauthorized(_) => codes::UNAUTHORIZED,
        ToolError::UnknownOperation(_) => codes::METHOD_NOT_FOUND,
        _ => codes::INTERNAL,
    }
}

pub fn error_from_wire(code: i64, message: String) -> ToolError {
    match code {
        codes::INVALID_PARAMS => ToolError::InvalidArguments(message),
        codes::UNAUTHORIZED => ToolError::Unauthorized(message),
        codes::METHOD_NOT_FOUND => ToolError::UnknownOperation(message),
        _ => ToolError::Server(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_roundtrip_preserves_error_kind() {
        let resp = WireResponse::err(4, &ToolError::Unauthorized("nope".into()));
        let json = serde_json::to_string(&resp).unwrap();
        let parsed: WireResponse = serde_json::from_str(&json).unwrap();
        match parsed.into_result() {
            Err(ToolError::Unauthorized(_)) => {}
            other => panic!("expected unauthorized, got {other:?}"),
        }
    }

    #[test]
    fn server_errors_map_to_transient() {
        let resp = WireResponse::err(1, &ToolError::Server("db down".into()));
        let err = resp.into_result().unwrap_err();
        assert!(err.is_transient());
    }

    #[test]
    fn ok_response_passes_the_payload() {
        let resp = WireResponse::ok(9, serde_json::json!({"x": 1}));
        assert_eq!(resp.into_result().unwrap()["x"], 1);
    }
}
