use std::cmp::Ordering;

use super::types::{SortDirection, SortField, TodoSort};
use crate::database::models::Todo;

pub struct FilterOrder;

impl FilterOrder {
    /// Unknown fields fall back to the default ordering; an unknown direction
    /// falls back to the field's natural direction.
    pub fn parse(sort_by: Option<&str>, order: Option<&str>) -> TodoSort {
        let field = match sort_by.map(str::trim) {
            Some("priority") => SortField::Priority,
            Some("dueDate") | Some("due_date") => SortField::DueDate,
            Some("status") => SortField::Status,
            Some("createdAt") | Some("created_at") => SortField::CreatedAt,
            _ => return TodoSort::default(),
        };

        let direction = match order.map(|o| o.trim().to_ascii_lowercase()).as_deref() {
            Some("asc") => SortDirection::Asc,
            Some("desc") => SortDirection::Desc,
            _ => field.default_direction(),
        };

        TodoSort { field, direction }
    }

    /// In-memory ordering; must agree with [`FilterOrder::generate`].
    pub fn compare(sort: &TodoSort, a: &Todo, b: &Todo) -> Ordering {
        let primary = match sort.field {
            SortField::CreatedAt => directed(sort.direction, a.created_at.cmp(&b.created_at)),
            SortField::Priority => directed(sort.direction, a.priority.rank().cmp(&b.priority.rank())),
            SortField::Status => directed(sort.direction, a.status.rank().cmp(&b.status.rank())),
            // Missing due dates sort last regardless of direction
            SortField::DueDate => match (a.due_date, b.due_date) {
                (Some(x), Some(y)) => directed(sort.direction, x.cmp(&y)),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
        };

        primary
            .then_with(|| b.created_at.cmp(&a.created_at))
            .then_with(|| b.id.cmp(&a.id))
    }

    pub fn generate(sort: &TodoSort) -> String {
        let dir = sort.direction.to_sql();
        let primary = match sort.field {
            SortField::CreatedAt => return format!("ORDER BY \"created_at\" {}, \"id\" DESC", dir),
            SortField::Priority => format!(
                "CASE \"priority\" WHEN 'low' THEN 0 WHEN 'medium' THEN 1 ELSE 2 END {}",
                dir
            ),
            SortField::Status => format!(
                "CASE \"status\" WHEN 'pending' THEN 0 WHEN 'in_progress' THEN 1 ELSE 2 END {}",
                dir
            ),
            SortField::DueDate => format!("\"due_date\" {} NULLS LAST", dir),
        };
        format!("ORDER BY {}, \"created_at\" DESC, \"id\" DESC", primary)
    }
}

fn directed(direction: SortDirection, ordering: Ordering) -> Ordering {
    match direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{TodoPriority, TodoStatus};
    use crate::database::ObjectId;
    use chrono::{Duration, Utc};

    fn todo(priority: TodoPriority, status: TodoStatus, due_in_hours: Option<i64>) -> Todo {
        let now = Utc::now();
        Todo {
            id: ObjectId::generate(),
            title: "t".to_string(),
            description: String::new(),
            status,
            priority,
            due_date: due_in_hours.map(|h| now + Duration::hours(h)),
            owner_id: ObjectId::generate(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn parse_defaults_to_created_at_desc() {
        assert_eq!(FilterOrder::parse(None, None), TodoSort::default());
        assert_eq!(FilterOrder::parse(Some("title"), Some("asc")), TodoSort::default());
    }

    #[test]
    fn parse_uses_field_default_direction() {
        let sort = FilterOrder::parse(Some("dueDate"), None);
        assert_eq!(sort.field, SortField::DueDate);
        assert_eq!(sort.direction, SortDirection::Asc);

        let sort = FilterOrder::parse(Some("priority"), Some("bogus"));
        assert_eq!(sort.direction, SortDirection::Desc);

        let sort = FilterOrder::parse(Some("status"), Some("DESC"));
        assert_eq!(sort.direction, SortDirection::Desc);
    }

    #[test]
    fn priority_sorts_by_rank_not_by_name() {
        let mut items = vec![
            todo(TodoPriority::Medium, TodoStatus::Pending, None),
            todo(TodoPriority::Low, TodoStatus::Pending, None),
            todo(TodoPriority::High, TodoStatus::Pending, None),
        ];
        let sort = FilterOrder::parse(Some("priority"), None);
        items.sort_by(|a, b| FilterOrder::compare(&sort, a, b));
        let order: Vec<_> = items.iter().map(|t| t.priority).collect();
        assert_eq!(order, vec![TodoPriority::High, TodoPriority::Medium, TodoPriority::Low]);
    }

    #[test]
    fn missing_due_dates_sort_last_both_ways() {
        let mut items = vec![
            todo(TodoPriority::Low, TodoStatus::Pending, None),
            todo(TodoPriority::Low, TodoStatus::Pending, Some(5)),
            todo(TodoPriority::Low, TodoStatus::Pending, Some(1)),
        ];

        let asc = FilterOrder::parse(Some("dueDate"), Some("asc"));
        items.sort_by(|a, b| FilterOrder::compare(&asc, a, b));
        assert!(items[0].due_date < items[1].due_date);
        assert!(items[2].due_date.is_none());

        let desc = FilterOrder::parse(Some("dueDate"), Some("desc"));
        items.sort_by(|a, b| FilterOrder::compare(&desc, a, b));
        assert!(items[0].due_date > items[1].due_date);
        assert!(items[2].due_date.is_none());
    }

    #[test]
    fn generate_emits_tie_breakers() {
        let sql = FilterOrder::generate(&TodoSort::default());
        assert_eq!(sql, "ORDER BY \"created_at\" DESC, \"id\" DESC");

        let sql = FilterOrder::generate(&FilterOrder::parse(Some("dueDate"), None));
        assert!(sql.starts_with("ORDER BY \"due_date\" ASC NULLS LAST"));
    }
}
