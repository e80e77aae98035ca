// handlers/protected/todos/mod.rs - Owner-scoped todo CRUD
//
// collection.rs: /api/todos        (GET list, POST create, DELETE all)
// record.rs:     /api/todos/:id    (GET, PUT, DELETE)
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

use crate::database::models::{NewTodo, TodoPatch};
use crate::validators::parse_due_date;
use crate::validators::todo::TodoFields;

pub mod collection;
pub mod record;

pub use collection::{todos_create, todos_delete_all, todos_list};
pub use record::{todo_delete, todo_get, todo_update};

/// Body of `POST /api/todos` and `PUT /api/todos/:id`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    /// Absent stays `None`; an explicit `null` becomes `Some(None)`.
    #[serde(default, deserialize_with = "present_or_null")]
    pub due_date: Option<Option<String>>,
}

fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl TodoRequest {
    pub fn fields(&self) -> TodoFields<'_> {
        TodoFields {
            title: self.title.as_deref(),
            description: self.description.as_deref(),
            status: self.status.as_deref(),
            priority: self.priority.as_deref(),
            due_date: self.due_date.as_ref().map(|d| d.as_deref()),
        }
    }

    fn due_date(&self) -> Option<DateTime<Utc>> {
        self.fields().due_date_value().and_then(parse_due_date)
    }

    /// Assumes the request already passed `validate_create_todo`.
    pub fn into_new_todo(self) -> NewTodo {
        let due_date = self.due_date();
        NewTodo {
            title: self.title.as_deref().map(str::trim).unwrap_or_default().to_string(),
            description: self.description.as_deref().map(str::trim).unwrap_or_default().to_string(),
            status: self.status.as_deref().and_then(|s| s.parse().ok()).unwrap_or_default(),
            priority: self.priority.as_deref().and_then(|p| p.parse().ok()).unwrap_or_default(),
            due_date,
        }
    }

    /// Assumes the request already passed `validate_update_todo`. A `null` or
    /// blank `dueDate` clears the due date.
    pub fn into_patch(self) -> TodoPatch {
        let due_date = self.due_date.as_ref().map(|_| self.due_date());
        TodoPatch {
            title: self.title.map(|t| t.trim().to_string()),
            description: self.description.map(|d| d.trim().to_string()),
            status: self.status.as_deref().and_then(|s| s.parse().ok()),
            priority: self.priority.as_deref().and_then(|p| p.parse().ok()),
            due_date,
        }
    }
}
