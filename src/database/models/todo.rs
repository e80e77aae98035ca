use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::database::ObjectId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TodoStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TodoPriority {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} value: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl TodoStatus {
    pub const ALL: [TodoStatus; 3] = [Self::Pending, Self::InProgress, Self::Completed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }

    /// Workflow position, used for ordering.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::InProgress => 1,
            Self::Completed => 2,
        }
    }
}

impl TodoPriority {
    pub const ALL: [TodoPriority; 3] = [Self::Low, Self::Medium, Self::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn rank(&self) -> u8 {
        match self {
            Self::Low => 0,
            Self::Medium => 1,
            Self::High => 2,
        }
    }
}

impl FromStr for TodoStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownVariant { kind: "status", value: s.to_string() })
    }
}

impl FromStr for TodoPriority {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|priority| priority.as_str() == s)
            .ok_or_else(|| UnknownVariant { kind: "priority", value: s.to_string() })
    }
}

impl fmt::Display for TodoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for TodoPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Todo {
    pub id: ObjectId,
    pub title: String,
    pub description: String,
    pub status: TodoStatus,
    pub priority: TodoPriority,
    pub due_date: Option<DateTime<Utc>>,
    pub owner_id: ObjectId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Todo {
    /// Derived at read time; never persisted.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        match self.due_date {
            Some(due) => self.status != TodoStatus::Completed && due < now,
            None => false,
        }
    }

    /// Overwrite only the fields present in `patch`.
    pub fn apply(&mut self, patch: &TodoPatch, now: DateTime<Utc>) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = due_date;
        }
        self.updated_at = now;
    }
}

#[derive(Debug, Clone)]
pub struct NewTodo {
    pub title: String,
    pub description: String,
    pub status: TodoStatus,
    pub priority: TodoPriority,
    pub due_date: Option<DateTime<Utc>>,
}

/// Partial update. `due_date: Some(None)` clears the due date.
#[derive(Debug, Clone, Default)]
pub struct TodoPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TodoStatus>,
    pub priority: Option<TodoPriority>,
    pub due_date: Option<Option<DateTime<Utc>>>,
}
