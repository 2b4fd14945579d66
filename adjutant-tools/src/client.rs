//! Retry-capable client for the tool protocol, with dry-run substitution.

use std::time::Duration;

use rand::Rng;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ToolError;

/// One outbound call to the tool server, however it is carried.
pub trait Transport {
    async fn call(&self, operation: &str, arguments: &Value) -> Result<Value, ToolError>;
}

/// Operational tuning knobs. These are configuration, not constants.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub jitter: bool,
    pub call_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            jitter: true,
            call_timeout: Duration::from_secs(30),
        }
    }
}

/// One human-readable line: operation name plus argument values.
pub fn describe_call(operation: &str, arguments: &Value) -> String {
    format!("[dry-run] would invoke {operation} with {arguments}")
}

pub struct ToolClient<T> {
    transport: T,
    policy: RetryPolicy,
    dry_run: bool,
}

impl<T: Transport> ToolClient<T> {
    pub fn new(transport: T, policy: RetryPolicy) -> Self {
        Self {
            transport,
            policy,
            dry_run: false,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Invoke a named operation.
    ///
    /// Transient failures retry with exponential backoff up to
    /// `max_attempts`; permanent failures propagate immediately. The backoff
    /// wait suspends only this call, and dropping the returned future stops
    /// the retry loop. In dry-run mode no call is performed at all: the
    /// return value is a description of what would have been invoked.
    pub async fn invoke(&self, operation: &str, arguments: Value) -> Result<Value, ToolError> {
        if self.dry_run {
            debug!(operation, "dry-run: substituting tool call");
            return Ok(Value::String(describe_call(operation, &arguments)));
        }

        let max = self.policy.max_attempts.max(1);
        let mut delay = self.policy.base_delay;
        let mut attempt = 1u32;

        loop {
            let outcome = tokio::time::timeout(
                self.policy.call_timeout,
                self.transport.call(operation, &arguments),
            )
            .await;

            let err = match outcome {
                Ok(Ok(result)) => {
                    debug!(operation, attempt, "tool call succeeded");
                    return Ok(result);
                }
                Ok(Err(e)) => e,
                Err(_) => ToolError::Timeout(self.policy.call_timeout),
            };

            if !err.is_transient() {
                warn!(operation, attempt, error = %err, "tool call failed permanently");
                return Err(err);
            }
            if attempt >= max {
                warn!(operation, attempts = attempt, error = %err, "tool call retries exhausted");
                return Err(ToolError::RetriesExhausted {
                    operation: operation.to_string(),
                    attempts: attempt,
                    last: Box::new(err),
                });
            }

            let wait = self.backoff_delay(delay);
            warn!(
                operation,
                attempt,
                wait_ms = wait.as_millis() as u64,
                error = %err,
                "transient tool failure; backing off"
            );
            tokio::time::sleep(wait).await;
            delay = delay.saturating_mul(2);
            attempt += 1;
        }
    }

    fn backoff_delay(&self, base: Duration) -> Duration {
        if !self.policy.jitter {
            return base;
        }
        let max_extra = (base.as_millis() / 2) as u64;
        if max_extra == 0 {
            return base;
        }
        let extra = rand::thread_rng().gen_range(0..=max_extra);
        base + Duration::from_millis(extra)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn describe_call_names_operation_and_arguments() {
        let line = describe_call("create_event", &json!({"user_id": 42, "summary": "Sync"}));
        assert!(line.contains("create_event"));
        assert!(line.contains("42"));
        assert!(line.contains("Sync"));
    }
}
