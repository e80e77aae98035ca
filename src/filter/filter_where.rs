use super::types::TodoFilter;
use crate::database::models::{Todo, TodoPriority, TodoStatus};

pub struct FilterWhere;

impl FilterWhere {
    /// Values outside the enums are ignored rather than rejected, so
    /// `?status=bogus` lists everything.
    pub fn parse(status: Option<&str>, priority: Option<&str>) -> TodoFilter {
        TodoFilter {
            status: status.and_then(|s| s.trim().parse::<TodoStatus>().ok()),
            priority: priority.and_then(|p| p.trim().parse::<TodoPriority>().ok()),
        }
    }

    pub fn matches(filter: &TodoFilter, todo: &Todo) -> bool {
        filter.status.map_or(true, |status| todo.status == status)
            && filter.priority.map_or(true, |priority| todo.priority == priority)
    }
}
