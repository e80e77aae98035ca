use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use super::{present, ValidationResult};
use crate::database::models::{TodoPriority, TodoStatus};

pub const TITLE_MAX_LEN: usize = 200;
pub const DESCRIPTION_MAX_LEN: usize = 1000;

/// Borrowed view of the todo fields in a request body.
///
/// `due_date` distinguishes "absent" (`None`) from an explicit `null`
/// (`Some(None)`); a blank string is treated like `null`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TodoFields<'a> {
    pub title: Option<&'a str>,
    pub description: Option<&'a str>,
    pub status: Option<&'a str>,
    pub priority: Option<&'a str>,
    pub due_date: Option<Option<&'a str>>,
}

impl<'a> TodoFields<'a> {
    /// The due date string, if one was actually supplied.
    pub fn due_date_value(&self) -> Option<&'a str> {
        self.due_date.flatten().map(str::trim).filter(|d| !d.is_empty())
    }
}

/// Accepts RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS[.f]` (read as UTC), or a
/// bare `YYYY-MM-DD` (midnight UTC).
pub fn parse_due_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

pub fn validate_create_todo(fields: &TodoFields<'_>, now: DateTime<Utc>) -> ValidationResult {
    let mut result = ValidationResult::new();

    match present(fields.title) {
        None => result.required("Title"),
        Some(title) => check_title_length(&mut result, title),
    }

    check_shared(&mut result, fields);

    if let Some(raw) = fields.due_date_value() {
        match parse_due_date(raw) {
            None => result.push("Due date is not a valid date"),
            Some(due) if due.date_naive() < now.date_naive() => {
                result.push("Due date must not be in the past");
            }
            Some(_) => {}
        }
    }

    result
}

/// Same per-field rules as create with every field optional. A past due date
/// is allowed here; only creation enforces it.
pub fn validate_update_todo(fields: &TodoFields<'_>) -> ValidationResult {
    let mut result = ValidationResult::new();

    if let Some(title) = fields.title {
        match present(Some(title)) {
            None => result.push("Title must not be blank"),
            Some(title) => check_title_length(&mut result, title),
        }
    }

    check_shared(&mut result, fields);

    if let Some(raw) = fields.due_date_value() {
        if parse_due_date(raw).is_none() {
            result.push("Due date is not a valid date");
        }
    }

    result
}

fn check_title_length(result: &mut ValidationResult, title: &str) {
    if title.chars().count() > TITLE_MAX_LEN {
        result.push(format!("Title must not exceed {} characters", TITLE_MAX_LEN));
    }
}

fn check_shared(result: &mut ValidationResult, fields: &TodoFields<'_>) {
    if let Some(description) = fields.description {
        if description.trim().chars().count() > DESCRIPTION_MAX_LEN {
            result.push(format!("Description must not exceed {} characters", DESCRIPTION_MAX_LEN));
        }
    }

    if let Some(status) = fields.status {
        if status.parse::<TodoStatus>().is_err() {
            result.push("Status is not valid");
        }
    }

    if let Some(priority) = fields.priority {
        if priority.parse::<TodoPriority>().is_err() {
            result.push("Priority is not valid");
        }
    }
}
