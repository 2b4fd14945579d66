//! Dispatch classified intents onto specialists and convert every failure
//! into a plain-language reply. A single request's failure never escapes.

use adjutant_core::intent::{Classified, HandlerKind, Intent};
use adjutant_tools::client::Transport;
use adjutant_tools::error::ToolError;

use crate::analytics::AnalyticsSpecialist;
use crate::command::CommandSpecialist;
use crate::personal::PersonalSpecialist;
use crate::specialist::AgentContext;
use crate::tasks::TaskSpecialist;

pub struct SpecialistRouter {
    tasks: TaskSpecialist,
    personal: PersonalSpecialist,
    command: CommandSpecialist,
    analytics: AnalyticsSpecialist,
}

impl Default for SpecialistRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl SpecialistRouter {
    pub fn new() -> Self {
        Self {
            tasks: TaskSpecialist,
            personal: PersonalSpecialist,
            command: CommandSpecialist,
            analytics: AnalyticsSpecialist,
        }
    }

    /// Route one classified request to its handler.
    ///
    /// An `Err` here is a tool failure the surface layer should count and
    /// phrase via [`user_message`]; nothing else escapes a specialist.
    pub async fn dispatch<T: Transport>(
        &self,
        classified: &Classified,
        ctx: &AgentContext<'_, T>,
    ) -> Result<String, ToolError> {
        match classified.intent.handler() {
            HandlerKind::TaskCreation => {
                self.tasks
                    .act(classified.intent, &classified.payload, ctx)
                    .await
            }
            HandlerKind::Scheduling => match classified.intent {
                Intent::SetTimezone => set_timezone(&classified.payload, ctx),
                _ => self.personal.act(&classified.payload, ctx).await,
            },
            HandlerKind::CommandHelp => {
                let reply = self.command.act(&classified.payload, ctx).await;
                match reply {
                    Ok(text) if !classified.recognized && classified.payload.starts_with('/') => {
                        Ok(format!(
                            "I don't recognize that command, so here's the closest help I have.\n\n{text}"
                        ))
                    }
                    other => other,
                }
            }
            HandlerKind::Analytics => self.analytics.act(classified.intent, ctx).await,
        }
    }
}

fn set_timezone<T: Transport>(payload: &str, ctx: &AgentContext<'_, T>) -> Result<String, ToolError> {
    let name = payload.trim();
    if name.is_empty() {
        return Ok("Which timezone? e.g. /set_timezone Asia/Ho_Chi_Minh".to_string());
    }
    match ctx.settings().set_timezone(ctx.user_id, name) {
        Ok(tz) => Ok(format!("Timezone set to {tz}")),
        Err(_) => Ok("Invalid timezone. Try something like Asia/Ho_Chi_Minh".to_string()),
    }
}

/// Plain-language message for a failure that reached the boundary.
pub fn user_message(err: &ToolError) -> String {
    match err {
        ToolError::RetriesExhausted { operation, .. } => format!(
            "The {operation} service didn't respond after several attempts. Please try again in a moment."
        ),
        ToolError::Timeout(_) | ToolError::Connection(_) | ToolError::Server(_) => {
            "The tool service is unavailable right now. Please try again in a moment.".to_string()
        }
        ToolError::InvalidArguments(msg) => {
            format!("That request was missing something: {msg}")
        }
        ToolError::Unauthorized(_) => "That action isn't allowed from here.".to_string(),
        ToolError::UnknownOperation(op) => format!("I don't know how to do '{op}' yet."),
    }
}
