use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

use crate::database::models::{Todo, TodoPriority, TodoStatus};
use crate::database::ObjectId;

/// Public wire format of a todo: `{ id, title, description, status, priority,
/// dueDate, createdBy, createdAt, updatedAt, overdue }`.
///
/// `overdue` is computed against the clock at serialization time.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoView {
    pub id: ObjectId,
    pub title: String,
    pub description: String,
    pub status: TodoStatus,
    pub priority: TodoPriority,
    #[serde(serialize_with = "serialize_optional_timestamp")]
    pub due_date: Option<DateTime<Utc>>,
    pub created_by: ObjectId,
    #[serde(serialize_with = "serialize_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "serialize_timestamp")]
    pub updated_at: DateTime<Utc>,
    pub overdue: bool,
}

impl TodoView {
    pub fn at(todo: Todo, now: DateTime<Utc>) -> Self {
        let overdue = todo.is_overdue(now);
        Self {
            id: todo.id,
            title: todo.title,
            description: todo.description,
            status: todo.status,
            priority: todo.priority,
            due_date: todo.due_date,
            created_by: todo.owner_id,
            created_at: todo.created_at,
            updated_at: todo.updated_at,
            overdue,
        }
    }
}

impl From<Todo> for TodoView {
    fn from(todo: Todo) -> Self {
        Self::at(todo, Utc::now())
    }
}

/// Millisecond-precision RFC 3339 with a `Z` suffix.
pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn serialize_timestamp<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_timestamp(value))
}

fn serialize_optional_timestamp<S: Serializer>(
    value: &Option<DateTime<Utc>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => serialize_timestamp(v, serializer),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    fn todo(status: TodoStatus, due_date: Option<DateTime<Utc>>) -> Todo {
        let created = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        Todo {
            id: ObjectId::parse("65a1b2c3d4e5f60718293a4b").unwrap(),
            title: "buy milk".to_string(),
            description: String::new(),
            status,
            priority: TodoPriority::High,
            due_date,
            owner_id: ObjectId::parse("65a1b2c3d4e5f60718293a4c").unwrap(),
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn wire_shape() {
        let now = Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap();
        let view = TodoView::at(todo(TodoStatus::InProgress, None), now);
        assert_eq!(
            serde_json::to_value(&view).unwrap(),
            json!({
                "id": "65a1b2c3d4e5f60718293a4b",
                "title": "buy milk",
                "description": "",
                "status": "in_progress",
                "priority": "high",
                "dueDate": null,
                "createdBy": "65a1b2c3d4e5f60718293a4c",
                "createdAt": "2026-03-01T09:00:00.000Z",
                "updatedAt": "2026-03-01T09:00:00.000Z",
                "overdue": false,
            })
        );
    }

    #[test]
    fn overdue_unless_completed() {
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 0, 0, 0).unwrap();
        let past = Some(now - Duration::days(1));
        assert!(TodoView::at(todo(TodoStatus::Pending, past), now).overdue);
        assert!(!TodoView::at(todo(TodoStatus::Completed, past), now).overdue);
        assert!(!TodoView::at(todo(TodoStatus::Pending, Some(now + Duration::days(1))), now).overdue);
    }
}
