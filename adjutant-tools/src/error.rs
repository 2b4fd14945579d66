//! Failure kinds for tool-protocol calls.
//!
//! The split that matters to callers: transient kinds get retried with
//! backoff, permanent kinds propagate immediately.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    /// Transport-level failure: spawn, pipe, or connection problems.
    #[error("tool server connection failed: {0}")]
    Connection(String),

    #[error("tool call timed out after {0:?}")]
    Timeout(Duration),

    /// Server-side internal error (the 5xx equivalent of the line protocol).
    #[error("tool server error: {0}")]
    Server(String),

    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("unknown operation '{0}'")]
    UnknownOperation(String),

    #[error("'{operation}' failed after {attempts} attempts: {last}")]
    RetriesExhausted {
        operation: String,
        attempts: u32,
        #[source]
        last: Box<ToolError>,
    },
}

impl ToolError {
    /// Transient failures are worth retrying; everything else propagates.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ToolError::Connection(_) | ToolError::Timeout(_) | ToolError::Server(_)
        )
    }
}
