//! Task model: what the extractor produces and the store keeps.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl TaskStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "in_progress" | "in-progress" | "started" => Some(Self::InProgress),
            "completed" | "done" => Some(Self::Completed),
            "cancelled" | "canceled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Priority levels in ascending order, so `Ord` sorts Low < Medium < High < Urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

impl Priority {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

/// A user task. Tasks are never physically deleted; cancellation is a status
/// transition like any other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub user_id: u64,

    /// Short human-readable title derived from the input text. Never empty.
    pub title: String,

    /// The full original input text.
    pub description: String,

    /// Optional due timestamp (UTC). Absent when no temporal phrase was detected.
    pub due_at: Option<DateTime<Utc>>,

    pub priority: Priority,
    pub status: TaskStatus,

    /// Lowercased `#word` tags, deduplicated and order-insensitive.
    pub tags: BTreeSet<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn new(id: u64, user_id: u64, title: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id,
            title: title.into(),
            description: String::new(),
            due_at: None,
            priority: Priority::Medium,
            status: TaskStatus::Pending,
            tags: BTreeSet::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_due(mut self, due_at: Option<DateTime<Utc>>) -> Self {
        self.due_at = due_at;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_tags(mut self, tags: BTreeSet<String>) -> Self {
        self.tags = tags;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_orders_low_to_urgent() {
        assert!(Priority::Low < Priority::Medium);
        assert!(Priority::Medium < Priority::High);
        assert!(Priority::High < Priority::Urgent);
    }

    #[test]
    fn status_parse_accepts_aliases() {
        assert_eq!(TaskStatus::parse("IN-PROGRESS"), Some(TaskStatus::InProgress));
        assert_eq!(TaskStatus::parse("done"), Some(TaskStatus::Completed));
        assert_eq!(TaskStatus::parse("nope"), None);
    }

    #[test]
    fn task_serializes_status_snake_case() {
        let now = Utc::now();
        let mut t = Task::new(1, 7, "Write report", now);
        t.status = TaskStatus::InProgress;
        let json = serde_json::to_string(&t).unwrap();
        assert!(json.contains("\"in_progress\""));
    }
}
