//! Analytics specialist: per-user stats and whole-process stats.

use adjutant_core::Intent;
use adjutant_tools::client::Transport;
use adjutant_tools::error::ToolError;

use crate::specialist::AgentContext;

pub struct AnalyticsSpecialist;

impl AnalyticsSpecialist {
    pub async fn act<T: Transport>(
        &self,
        intent: Intent,
        ctx: &AgentContext<'_, T>,
    ) -> Result<String, ToolError> {
        match intent {
            Intent::System => Ok(self.system(ctx)),
            _ => Ok(self.stats(ctx)),
        }
    }

    fn stats<T: Transport>(&self, ctx: &AgentContext<'_, T>) -> String {
        let mut out = String::from("Your statistics:\n");

        match ctx.metrics.user_stats(ctx.user_id) {
            Some(user) => {
                out.push_str(&format!("Commands used: {}\n", user.commands));
                let mut by_command: Vec<(String, u64)> = user.by_command.into_iter().collect();
                by_command.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
                for (command, count) in by_command.into_iter().take(5) {
                    out.push_str(&format!("- {command}: {count}\n"));
                }
            }
            None => out.push_str("No commands recorded yet.\n"),
        }

        let summary = ctx.store().summary(ctx.user_id, ctx.now);
        out.push_str(&format!(
            "Tasks: {} total ({} pending, {} in progress, {} completed, {} cancelled)\n",
            summary.total,
            summary.pending,
            summary.in_progress,
            summary.completed,
            summary.cancelled
        ));
        if summary.overdue > 0 {
            out.push_str(&format!("Overdue: {}\n", summary.overdue));
        }
        out.trim_end().to_string()
    }

    fn system<T: Transport>(&self, ctx: &AgentContext<'_, T>) -> String {
        let s = ctx.metrics.system_stats(ctx.now);
        format!(
            "System:\n\
             Uptime: {}s\n\
             Commands: {} (errors: {}, error rate: {:.1}%)\n\
             Throughput: {:.2} commands/min",
            s.uptime_secs,
            s.total_commands,
            s.total_errors,
            s.error_rate * 100.0,
            s.commands_per_minute
        )
    }
}
