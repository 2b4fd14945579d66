//! Scheduling specialist: create calendar events from natural language,
//! show today's agenda, propose free slots.

use chrono::Duration;
use serde_json::{Value, json};

use adjutant_core::timeparse::{contains_clock_time, detect_due, duration_minutes};
use adjutant_core::extract::derive_title;
use adjutant_tools::client::Transport;
use adjutant_tools::error::ToolError;
use adjutant_tools::registry::{OP_CREATE_EVENT, OP_LIST_TODAY, OP_PROPOSE_SLOTS};

use crate::specialist::{AgentContext, invoke_allowed};

const NAME: &str = "personal";
const ALLOWED: &[&str] = &[OP_CREATE_EVENT, OP_LIST_TODAY, OP_PROPOSE_SLOTS];

pub struct PersonalSpecialist;

impl PersonalSpecialist {
    pub async fn act<T: Transport>(
        &self,
        input: &str,
        ctx: &AgentContext<'_, T>,
    ) -> Result<String, ToolError> {
        let lowered = input.to_lowercase();

        if lowered.contains("agenda") || (lowered.contains("today") && !contains_clock_time(input))
        {
            let value = self
                .invoke(ctx, OP_LIST_TODAY, json!({"user_id": ctx.user_id}))
                .await?;
            return Ok(format_agenda(&value));
        }

        if lowered.contains("slot") || lowered.contains("free time") {
            let minutes = duration_minutes(input).unwrap_or(30);
            let value = self
                .invoke(
                    ctx,
                    OP_PROPOSE_SLOTS,
                    json!({"user_id": ctx.user_id, "minutes": minutes, "count": 3}),
                )
                .await?;
            return Ok(format_slots(&value));
        }

        if !contains_clock_time(input) {
            return Ok("What time should I schedule it? (e.g., 10:30 or 3pm)".to_string());
        }
        let Some(start) = detect_due(input, ctx.now, ctx.tz, ctx.extractor.default_hour) else {
            return Ok("I couldn't parse a time. Try: 'tomorrow 3pm for 45m Team sync'".to_string());
        };
        let minutes = duration_minutes(input).unwrap_or(60);
        let end = start + Duration::minutes(minutes);
        let summary = derive_title(input, ctx.extractor);

        let value = self
            .invoke(
                ctx,
                OP_CREATE_EVENT,
                json!({
                    "user_id": ctx.user_id,
                    "summary": summary,
                    "start_iso": start.to_rfc3339(),
                    "end_iso": end.to_rfc3339(),
                }),
            )
            .await?;

        match value {
            Value::String(s) if s.starts_with("[dry-run]") => Ok(s),
            Value::String(link) => Ok(format!("Event created: {link}")),
            other => Ok(format!("Event created: {other}")),
        }
    }

    async fn invoke<T: Transport>(
        &self,
        ctx: &AgentContext<'_, T>,
        operation: &str,
        arguments: Value,
    ) -> Result<Value, ToolError> {
        invoke_allowed(ctx.client, NAME, ALLOWED, operation, arguments).await
    }
}

fn format_agenda(value: &Value) -> String {
    // Dry-run hands back the description line instead of an event list.
    if let Some(s) = value.as_str() {
        return s.to_string();
    }
    let Some(events) = value.as_array() else {
        return "No events today.".to_string();
    };
    if events.is_empty() {
        return "No events today.".to_string();
    }
    let mut out = String::from("Today:\n");
    for e in events {
        let summary = e.get("summary").and_then(Value::as_str).unwrap_or("(no summary)");
        let start = e.get("start").and_then(Value::as_str).unwrap_or("?");
        out.push_str(&format!("- {start}  {summary}\n"));
    }
    out.trim_end().to_string()
}

fn format_slots(value: &Value) -> String {
    if let Some(s) = value.as_str() {
        return s.to_string();
    }
    let Some(slots) = value.as_array() else {
        return "No free slots found this week.".to_string();
    };
    if slots.is_empty() {
        return "No free slots found this week.".to_string();
    }
    let mut out = String::from("Free slots:\n");
    for s in slots {
        let start = s.get("start").and_then(Value::as_str).unwrap_or("?");
        let end = s.get("end").and_then(Value::as_str).unwrap_or("?");
        out.push_str(&format!("- {start} -> {end}\n"));
    }
    out.trim_end().to_string()
}
