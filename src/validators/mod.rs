//! Field-level input validation.
//!
//! Every validator is total: it never panics and always returns a
//! [`ValidationResult`] listing every problem found, in field order. Mapping
//! a failed result to an HTTP status is the caller's job.

pub mod auth;
pub mod todo;

pub use auth::{is_valid_email, validate_login, validate_register};
pub use todo::{parse_due_date, validate_create_todo, validate_update_todo};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    pub errors: Vec<String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn push(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    fn required(&mut self, field: &str) {
        self.push(format!("{} is required", field));
    }
}

/// `None` and whitespace-only strings both count as missing.
fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
