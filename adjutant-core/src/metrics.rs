//! Command usage counters behind the stats/system commands.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Default)]
pub struct CommandStats {
    pub calls: u64,
    pub ok: u64,
    pub errors: u64,
    pub total_ms: u64,
}

impl CommandStats {
    pub fn avg_ms(&self) -> u64 {
        if self.ok == 0 { 0 } else { self.total_ms / self.ok }
    }
}

#[derive(Debug, Clone, Default)]
pub struct UserStats {
    pub commands: u64,
    pub by_command: HashMap<String, u64>,
    pub last_active: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SystemStats {
    pub uptime_secs: i64,
    pub total_commands: u64,
    pub total_errors: u64,
    pub error_rate: f64,
    pub commands_per_minute: f64,
}

#[derive(Debug, Default)]
struct Inner {
    commands: HashMap<String, CommandStats>,
    users: HashMap<u64, UserStats>,
}

/// Process-wide collector. Lock scope stays small and never spans an await.
#[derive(Debug)]
pub struct MetricsCollector {
    started: DateTime<Utc>,
    inner: Mutex<Inner>,
}

impl MetricsCollector {
    pub fn new(started: DateTime<Utc>) -> Self {
        Self {
            started,
            inner: Mutex::new(Inner::default()),
        }
    }

    fn locked(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn record(&self, command: &str, user_id: u64, elapsed_ms: u64, ok: bool, now: DateTime<Utc>) {
        let mut inner = self.locked();

        let cmd = inner.commands.entry(command.to_string()).or_default();
        cmd.calls += 1;
        cmd.total_ms += elapsed_ms;
        if ok {
            cmd.ok += 1;
        } else {
            cmd.errors += 1;
        }

        let user = inner.users.entry(user_id).or_default();
        user.commands += 1;
        *user.by_command.entry(command.to_string()).or_default() += 1;
        user.last_active = Some(now);
    }

    pub fn command_stats(&self) -> HashMap<String, CommandStats> {
        self.locked().commands.clone()
    }

    pub fn user_stats(&self, user_id: u64) -> Option<UserStats> {
        self.locked().users.get(&user_id).cloned()
    }

    pub fn system_stats(&self, now: DateTime<Utc>) -> SystemStats {
        let inner = self.locked();
        let total_commands: u64 = inner.commands.values().map(|c| c.calls).sum();
        let total_errors: u64 = inner.commands.values().map(|c| c.errors).sum();
        let uptime_secs = (now - self.started).num_seconds().max(0);

        SystemStats {
            uptime_secs,
            total_commands,
            total_errors,
            error_rate: if total_commands == 0 {
                0.0
            } else {
                total_errors as f64 / total_commands as f64
            },
            commands_per_minute: if uptime_secs == 0 {
                0.0
            } else {
                total_commands as f64 / (uptime_secs as f64 / 60.0)
            },
        }
    }
}
