use serde::{Deserialize, Serialize};

use crate::database::models::{TodoPriority, TodoStatus};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    CreatedAt,
    Priority,
    DueDate,
    Status,
}

impl SortField {
    /// Direction used when the client names a field without an order.
    pub fn default_direction(&self) -> SortDirection {
        match self {
            SortField::CreatedAt | SortField::Priority => SortDirection::Desc,
            SortField::DueDate | SortField::Status => SortDirection::Asc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TodoSort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for TodoSort {
    fn default() -> Self {
        Self {
            field: SortField::CreatedAt,
            direction: SortDirection::Desc,
        }
    }
}

/// Exact-match filters. `None` matches every value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TodoFilter {
    pub status: Option<TodoStatus>,
    pub priority: Option<TodoPriority>,
}

/// Raw list query parameters as they arrive on the wire.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TodoQuery {
    pub filter: TodoFilter,
    pub sort: TodoSort,
    pub page: u32,
    pub limit: u32,
}

impl Default for TodoQuery {
    fn default() -> Self {
        Self {
            filter: TodoFilter::default(),
            sort: TodoSort::default(),
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u64,
}
