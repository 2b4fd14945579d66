//! Shared plumbing for specialists: the per-request context and the
//! allowlisted tool invocation guard.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde_json::Value;

use adjutant_core::{ExtractorConfig, MetricsCollector, ResponseCache, TaskStore, UserSettings};
use adjutant_tools::client::{ToolClient, Transport};
use adjutant_tools::error::ToolError;

use crate::llm::LlmConfig;

/// Everything a specialist needs to answer one request. Built per request by
/// the surface layer; the referenced pieces live in the application context.
pub struct AgentContext<'a, T: Transport> {
    pub user_id: u64,
    /// Injected request time; specialists never read an ambient clock.
    pub now: DateTime<Utc>,
    pub tz: Tz,
    pub client: &'a ToolClient<T>,
    pub cache: &'a ResponseCache,
    pub store: &'a Mutex<TaskStore>,
    pub settings: &'a Mutex<UserSettings>,
    pub metrics: &'a MetricsCollector,
    pub extractor: &'a ExtractorConfig,
    pub llm: &'a LlmConfig,
}

impl<'a, T: Transport> AgentContext<'a, T> {
    pub fn store(&self) -> MutexGuard<'a, TaskStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn settings(&self) -> MutexGuard<'a, UserSettings> {
        self.settings.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Invoke a tool on behalf of a named specialist. The specialist's own
/// allowlist is checked before the call and the caller identity is stamped
/// into the arguments so the server can enforce its side too.
pub async fn invoke_allowed<T: Transport>(
    client: &ToolClient<T>,
    specialist: &str,
    allowed: &[&str],
    operation: &str,
    mut arguments: Value,
) -> Result<Value, ToolError> {
    if !allowed.contains(&operation) {
        return Err(ToolError::Unauthorized(format!(
            "{specialist} cannot call '{operation}'"
        )));
    }
    if let Some(map) = arguments.as_object_mut() {
        map.entry("caller")
            .or_insert_with(|| Value::String(specialist.to_string()));
    }
    client.invoke(operation, arguments).await
}
