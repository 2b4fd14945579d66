//! Task-creation specialist: create from free text, list, complete.

use adjutant_core::{Intent, TaskStatus, extract_fields, task::Task};
use adjutant_tools::client::Transport;
use adjutant_tools::error::ToolError;

use crate::specialist::AgentContext;

pub struct TaskSpecialist;

impl TaskSpecialist {
    pub async fn act<T: Transport>(
        &self,
        intent: Intent,
        payload: &str,
        ctx: &AgentContext<'_, T>,
    ) -> Result<String, ToolError> {
        match intent {
            Intent::CreateTask => Ok(self.create(payload, ctx)),
            Intent::ListTasks => Ok(self.list(payload, ctx)),
            Intent::CompleteTask => Ok(self.complete(payload, ctx)),
            _ => Ok(self.list("", ctx)),
        }
    }

    fn create<T: Transport>(&self, description: &str, ctx: &AgentContext<'_, T>) -> String {
        let description = description.trim();
        if description.is_empty() {
            return "What should the task say? e.g. /task Buy groceries tomorrow 5pm".to_string();
        }
        let fields = extract_fields(description, ctx.now, ctx.tz, ctx.extractor);
        let task = ctx
            .store()
            .create(ctx.user_id, fields, description, ctx.now);
        format_created(&task)
    }

    fn list<T: Transport>(&self, status_arg: &str, ctx: &AgentContext<'_, T>) -> String {
        let status = match status_arg.trim() {
            "" => Some(TaskStatus::Pending),
            s => match TaskStatus::parse(s) {
                Some(status) => Some(status),
                None => {
                    return format!(
                        "Unknown status '{s}'. Use one of: pending, in_progress, completed, cancelled"
                    );
                }
            },
        };

        let store = ctx.store();
        let tasks = store.list(ctx.user_id, status);
        if tasks.is_empty() {
            let label = status.map(|s| s.label()).unwrap_or("matching");
            return format!("No {label} tasks found.");
        }

        let mut out = String::from("Your tasks:\n");
        for t in tasks.iter().take(10) {
            out.push_str(&format_line(t));
            out.push('\n');
        }
        if tasks.len() > 10 {
            out.push_str(&format!("... and {} more\n", tasks.len() - 10));
        }
        out.trim_end().to_string()
    }

    fn complete<T: Transport>(&self, id_arg: &str, ctx: &AgentContext<'_, T>) -> String {
        let Ok(id) = id_arg.trim().trim_start_matches('#').parse::<u64>() else {
            return "Give me a task id, e.g. /complete 3".to_string();
        };
        match ctx
            .store()
            .set_status(ctx.user_id, id, TaskStatus::Completed, ctx.now)
        {
            Some(task) => format!("Task #{} completed: {}", task.id, task.title),
            None => format!("Task #{id} not found."),
        }
    }
}

fn format_created(task: &Task) -> String {
    let mut out = format!("Task #{} created: {}", task.id, task.title);
    if let Some(due) = task.due_at {
        out.push_str(&format!("\nDue: {}", due.format("%Y-%m-%d %H:%M UTC")));
    }
    out.push_str(&format!("\nPriority: {}", task.priority.label()));
    if !task.tags.is_empty() {
        let tags: Vec<&str> = task.tags.iter().map(String::as_str).collect();
        out.push_str(&format!("\nTags: {}", tags.join(", ")));
    }
    out
}

fn format_line(task: &Task) -> String {
    let mut line = format!("#{} {} [{}]", task.id, task.title, task.priority.label());
    if let Some(due) = task.due_at {
        line.push_str(&format!(" due {}", due.format("%Y-%m-%d %H:%M")));
    }
    if !task.tags.is_empty() {
        let tags: Vec<String> = task.tags.iter().map(|t| format!("#{t}")).collect();
        line.push_str(&format!(" {}", tags.join(" ")));
    }
    line
}
