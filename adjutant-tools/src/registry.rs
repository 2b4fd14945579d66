//! Server-side tool registry: named operations behind a caller allowlist.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::info;

use crate::calendar::CalendarStore;
use crate::docs::DocsClient;
use crate::error::ToolError;

pub const OP_CREATE_EVENT: &str = "create_event";
pub const OP_SEARCH_DOCS: &str = "search_docs";
pub const OP_LIST_TODAY: &str = "list_today";
pub const OP_PROPOSE_SLOTS: &str = "propose_slots";

fn default_allowlist() -> HashMap<String, HashSet<String>> {
    let mut map = HashMap::new();
    map.insert(
        "personal".to_string(),
        [OP_CREATE_EVENT, OP_LIST_TODAY, OP_PROPOSE_SLOTS]
            .iter()
            .map(|s| s.to_string())
            .collect(),
    );
    map.insert(
        "command".to_string(),
        [OP_SEARCH_DOCS].iter().map(|s| s.to_string()).collect(),
    );
    map
}

#[derive(Debug, Deserialize)]
struct CreateEventArgs {
    user_id: u64,
    summary: String,
    start_iso: String,
    end_iso: String,
}

#[derive(Debug, Deserialize)]
struct SearchDocsArgs {
    query: String,
}

#[derive(Debug, Deserialize)]
struct ListTodayArgs {
    user_id: u64,
}

#[derive(Debug, Deserialize)]
struct ProposeSlotsArgs {
    user_id: u64,
    minutes: i64,
    count: usize,
}

fn parse_args<T: DeserializeOwned>(operation: &str, value: &Value) -> Result<T, ToolError> {
    serde_json::from_value(value.clone())
        .map_err(|e| ToolError::InvalidArguments(format!("{operation}: {e}")))
}

fn parse_iso(field: &str, s: &str) -> Result<DateTime<Utc>, ToolError> {
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| ToolError::InvalidArguments(format!("{field} '{s}': {e}")))
}

pub struct ToolRegistry {
    calendar: CalendarStore,
    docs: DocsClient,
    allowlist: HashMap<String, HashSet<String>>,
}

impl ToolRegistry {
    pub fn new(docs: DocsClient) -> Self {
        Self {
            calendar: CalendarStore::new(),
            docs,
            allowlist: default_allowlist(),
        }
    }

    pub fn with_allowlist(mut self, allowlist: HashMap<String, HashSet<String>>) -> Self {
        self.allowlist = allowlist;
        self
    }

    pub fn calendar(&self) -> &CalendarStore {
        &self.calendar
    }

    fn enforce_caller(&self, operation: &str, args: &Value) -> Result<(), ToolError> {
        let caller = args
            .get("caller")
            .and_then(Value::as_str)
            .unwrap_or_default();
        if caller.is_empty() {
            return Err(ToolError::Unauthorized(
                "missing 'caller' for tool invocation".to_string(),
            ));
        }
        let allowed = self
            .allowlist
            .get(caller)
            .is_some_and(|ops| ops.contains(operation));
        if !allowed {
            return Err(ToolError::Unauthorized(format!(
                "caller '{caller}' is not allowed to use '{operation}'"
            )));
        }
        Ok(())
    }

    pub async fn dispatch(&self, operation: &str, args: &Value) -> Result<Value, ToolError> {
        self.enforce_caller(operation, args)?;
        info!(operation, "tool call");

        match operation {
            OP_CREATE_EVENT => {
                let a: CreateEventArgs = parse_args(operation, args)?;
                let start = parse_iso("start_iso", &a.start_iso)?;
                let end = parse_iso("end_iso", &a.end_iso)?;
                if end <= start {
                    return Err(ToolError::InvalidArguments(
                        "end must be after start".to_string(),
                    ));
                }
                let link = self.calendar.create_event(a.user_id, &a.summary, start, end);
                Ok(Value::String(link))
            }
            OP_SEARCH_DOCS => {
                let a: SearchDocsArgs = parse_args(operation, args)?;
                let (content, sources) = self.docs.fetch_context(&a.query).await?;
                Ok(json!({"content": content, "sources": sources}))
            }
            OP_LIST_TODAY => {
                let a: ListTodayArgs = parse_args(operation, args)?;
                let events = self.calendar.list_today(a.user_id, Utc::now());
                Ok(json!(events))
            }
            OP_PROPOSE_SLOTS => {
                let a: ProposeSlotsArgs = parse_args(operation, args)?;
                if a.minutes <= 0 || a.count == 0 {
                    return Err(ToolError::InvalidArguments(
                        "minutes and count must be positive".to_string(),
                    ));
                }
                let slots = self
                    .calendar
                    .propose_slots(a.user_id, a.minutes, a.count, Utc::now());
                Ok(json!(slots))
            }
            other => Err(ToolError::UnknownOperation(other.to_string())),
        }
    }
}
