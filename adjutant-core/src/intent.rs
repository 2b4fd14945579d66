//! Intent labels for inbound commands and their routing onto handler roles.
//!
//! Routing is a pure mapping from a small closed set of intents onto exactly
//! four handlers. Anything we cannot classify falls back to command help with
//! a clarification, never a hard failure.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    CreateTask,
    ListTasks,
    CompleteTask,
    AskPersonal,
    SetTimezone,
    Help,
    Stats,
    System,
}

/// The four specialist roles a request can land on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerKind {
    TaskCreation,
    Scheduling,
    CommandHelp,
    Analytics,
}

impl Intent {
    /// Total mapping; every intent lands on exactly one handler.
    pub fn handler(self) -> HandlerKind {
        match self {
            Intent::CreateTask | Intent::ListTasks | Intent::CompleteTask => {
                HandlerKind::TaskCreation
            }
            Intent::AskPersonal | Intent::SetTimezone => HandlerKind::Scheduling,
            Intent::Help => HandlerKind::CommandHelp,
            Intent::Stats | Intent::System => HandlerKind::Analytics,
        }
    }

    /// Map a command name (as typed after the platform prefix) to an intent.
    pub fn from_command(name: &str) -> Option<Intent> {
        match name.trim().to_lowercase().as_str() {
            "task" => Some(Intent::CreateTask),
            "tasks" => Some(Intent::ListTasks),
            "complete" | "done" => Some(Intent::CompleteTask),
            "ask_personal" | "ask-personal" | "ask" => Some(Intent::AskPersonal),
            "set_timezone" | "set-timezone" | "timezone" => Some(Intent::SetTimezone),
            "help" => Some(Intent::Help),
            "stats" => Some(Intent::Stats),
            "system" => Some(Intent::System),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Intent::CreateTask => "task",
            Intent::ListTasks => "tasks",
            Intent::CompleteTask => "complete",
            Intent::AskPersonal => "ask_personal",
            Intent::SetTimezone => "set_timezone",
            Intent::Help => "help",
            Intent::Stats => "stats",
            Intent::System => "system",
        }
    }
}

/// Result of classifying one raw inbound line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    pub intent: Intent,
    /// Text after the command token, or the whole line for the fallback.
    pub payload: String,
    /// False when we defaulted to the help path.
    pub recognized: bool,
}

/// Classify a raw platform message: a leading `/command` (or `!command`)
/// selects its intent; plain text goes to the help path, which is also where
/// unknown commands land.
pub fn classify(line: &str) -> Classified {
    let trimmed = line.trim();
    let stripped = trimmed
        .strip_prefix('/')
        .or_else(|| trimmed.strip_prefix('!'));

    if let Some(rest) = stripped {
        let mut parts = rest.splitn(2, char::is_whitespace);
        let name = parts.next().unwrap_or_default();
        let payload = parts.next().unwrap_or_default().trim().to_string();
        if let Some(intent) = Intent::from_command(name) {
            return Classified {
                intent,
                payload,
                recognized: true,
            };
        }
    }

    Classified {
        intent: Intent::Help,
        payload: trimmed.to_string(),
        recognized: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_intent_routes_to_one_handler() {
        use Intent::*;
        let cases = [
            (CreateTask, HandlerKind::TaskCreation),
            (ListTasks, HandlerKind::TaskCreation),
            (CompleteTask, HandlerKind::TaskCreation),
            (AskPersonal, HandlerKind::Scheduling),
            (SetTimezone, HandlerKind::Scheduling),
            (Help, HandlerKind::CommandHelp),
            (Stats, HandlerKind::Analytics),
            (System, HandlerKind::Analytics),
        ];
        for (intent, handler) in cases {
            assert_eq!(intent.handler(), handler);
        }
    }

    #[test]
    fn slash_commands_classify_with_payload() {
        let c = classify("/task Buy milk tomorrow");
        assert_eq!(c.intent, Intent::CreateTask);
        assert_eq!(c.payload, "Buy milk tomorrow");
        assert!(c.recognized);
    }

    #[test]
    fn unknown_commands_default_to_help() {
        let c = classify("/frobnicate the widget");
        assert_eq!(c.intent, Intent::Help);
        assert!(!c.recognized);
        assert_eq!(c.payload, "/frobnicate the widget");
    }

    #[test]
    fn plain_text_goes_to_help() {
        let c = classify("how does tar work");
        assert_eq!(c.intent, Intent::Help);
        assert!(!c.recognized);
    }
}
