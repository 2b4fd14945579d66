//! In-memory task store: per-user monotonic ids and status transitions.
//!
//! Tasks are never removed; cancellation and completion are transitions.
//! Listing mirrors the common inbox ordering: due date ascending (undated
//! last), then priority descending, then newest first.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::extract::TaskFields;
use crate::task::{Priority, Task, TaskStatus};

#[derive(Debug, Default)]
struct UserTasks {
    next_id: u64,
    tasks: Vec<Task>,
}

#[derive(Debug, Default)]
pub struct TaskStore {
    users: HashMap<u64, UserTasks>,
}

/// Per-user counts for the analytics surface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskSummary {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub cancelled: usize,
    pub overdue: usize,
    pub by_priority: Vec<(Priority, usize)>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a task from extracted fields. Ids are monotonic per user and
    /// start at 1; independent users do not share a sequence.
    pub fn create(
        &mut self,
        user_id: u64,
        fields: TaskFields,
        description: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Task {
        let user = self.users.entry(user_id).or_default();
        user.next_id += 1;
        let task = Task::new(user.next_id, user_id, fields.title, now)
            .with_description(description)
            .with_due(fields.due_at)
            .with_priority(fields.priority)
            .with_tags(fields.tags);
        user.tasks.push(task.clone());
        task
    }

    pub fn get(&self, user_id: u64, id: u64) -> Option<&Task> {
        self.users
            .get(&user_id)
            .and_then(|u| u.tasks.iter().find(|t| t.id == id))
    }

    /// List a user's tasks, optionally filtered by status.
    pub fn list(&self, user_id: u64, status: Option<TaskStatus>) -> Vec<&Task> {
        let mut out: Vec<&Task> = match self.users.get(&user_id) {
            Some(u) => u
                .tasks
                .iter()
                .filter(|t| status.is_none_or(|s| t.status == s))
                .collect(),
            None => Vec::new(),
        };
        out.sort_by(|a, b| compare_for_listing(a, b));
        out
    }

    /// Transition a task's status. Returns the updated task, or None when the
    /// id does not exist for that user.
    pub fn set_status(
        &mut self,
        user_id: u64,
        id: u64,
        status: TaskStatus,
        now: DateTime<Utc>,
    ) -> Option<Task> {
        let user = self.users.get_mut(&user_id)?;
        let task = user.tasks.iter_mut().find(|t| t.id == id)?;
        task.status = status;
        task.updated_at = now;
        Some(task.clone())
    }

    pub fn summary(&self, user_id: u64, now: DateTime<Utc>) -> TaskSummary {
        let mut s = TaskSummary::default();
        let Some(user) = self.users.get(&user_id) else {
            return s;
        };

        let mut by_priority: HashMap<Priority, usize> = HashMap::new();
        for t in &user.tasks {
            s.total += 1;
            match t.status {
                TaskStatus::Pending => s.pending += 1,
                TaskStatus::InProgress => s.in_progress += 1,
                TaskStatus::Completed => s.completed += 1,
                TaskStatus::Cancelled => s.cancelled += 1,
            }
            if t.status == TaskStatus::Pending {
                if let Some(due) = t.due_at {
                    if due < now {
                        s.overdue += 1;
                    }
                }
                *by_priority.entry(t.priority).or_default() += 1;
            }
        }

        let mut by_priority: Vec<(Priority, usize)> = by_priority.into_iter().collect();
        by_priority.sort_by(|a, b| b.0.cmp(&a.0));
        s.by_priority = by_priority;
        s
    }
}

fn compare_for_listing(a: &Task, b: &Task) -> Ordering {
    match (a.due_at, b.due_at) {
        (Some(x), Some(y)) if x != y => return x.cmp(&y),
        (Some(_), None) => return Ordering::Less,
        (None, Some(_)) => return Ordering::Greater,
        _ => {}
    }
    b.priority
        .cmp(&a.priority)
        .then(b.created_at.cmp(&a.created_at))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone as _};
    use std::collections::BTreeSet;

    fn fields(title: &str) -> TaskFields {
        TaskFields {
            title: title.to_string(),
            due_at: None,
            priority: Priority::Medium,
            tags: BTreeSet::new(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn ids_are_monotonic_per_user() {
        let mut store = TaskStore::new();
        let a = store.create(1, fields("a"), "a", now());
        let b = store.create(1, fields("b"), "b", now());
        let other = store.create(2, fields("c"), "c", now());
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        // Independent users get their own sequence.
        assert_eq!(other.id, 1);
    }

    #[test]
    fn completion_is_a_status_transition() {
        let mut store = TaskStore::new();
        let t = store.create(1, fields("ship"), "ship", now());
        let later = now() + Duration::hours(1);
        let done = store.set_status(1, t.id, TaskStatus::Completed, later).unwrap();
        assert_eq!(done.status, TaskStatus::Completed);
        assert_eq!(done.updated_at, later);
        // Still present: no physical deletion.
        assert!(store.get(1, t.id).is_some());
    }

    #[test]
    fn set_status_is_scoped_to_the_owner() {
        let mut store = TaskStore::new();
        let t = store.create(1, fields("mine"), "mine", now());
        assert!(store.set_status(2, t.id, TaskStatus::Completed, now()).is_none());
    }

    #[test]
    fn listing_orders_due_then_priority_then_newest() {
        let mut store = TaskStore::new();

        let mut undated_high = fields("undated high");
        undated_high.priority = Priority::High;
        store.create(1, undated_high, "", now());

        let mut due_late = fields("due late");
        due_late.due_at = Some(now() + Duration::days(3));
        store.create(1, due_late, "", now());

        let mut due_soon = fields("due soon");
        due_soon.due_at = Some(now() + Duration::hours(1));
        store.create(1, due_soon, "", now());

        let titles: Vec<&str> = store
            .list(1, None)
            .into_iter()
            .map(|t| t.title.as_str())
            .collect();
        assert_eq!(titles, vec!["due soon", "due late", "undated high"]);
    }

    #[test]
    fn list_filters_by_status() {
        let mut store = TaskStore::new();
        let t = store.create(1, fields("a"), "", now());
        store.create(1, fields("b"), "", now());
        store.set_status(1, t.id, TaskStatus::Completed, now());

        assert_eq!(store.list(1, Some(TaskStatus::Pending)).len(), 1);
        assert_eq!(store.list(1, Some(TaskStatus::Completed)).len(), 1);
        assert_eq!(store.list(1, None).len(), 2);
    }

    #[test]
    fn summary_counts_overdue_pending_only() {
        let mut store = TaskStore::new();
        let mut overdue = fields("late");
        overdue.due_at = Some(now() - Duration::hours(2));
        store.create(1, overdue, "", now());

        let mut done_late = fields("done late");
        done_late.due_at = Some(now() - Duration::hours(2));
        let d = store.create(1, done_late, "", now());
        store.set_status(1, d.id, TaskStatus::Completed, now());

        let s = store.summary(1, now());
        assert_eq!(s.total, 2);
        assert_eq!(s.overdue, 1);
        assert_eq!(s.completed, 1);
    }
}
