use once_cell::sync::Lazy;
use regex::Regex;

use super::{present, ValidationResult};

pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 30;
pub const PASSWORD_MIN_LEN: usize = 6;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\w+([.-]?\w+)*@\w+([.-]?\w+)*(\.\w{2,3})+$").expect("email pattern compiles")
});

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

pub fn validate_register(
    username: Option<&str>,
    email: Option<&str>,
    password: Option<&str>,
    confirm_password: Option<&str>,
) -> ValidationResult {
    let mut result = ValidationResult::new();

    match present(username) {
        None => result.required("Username"),
        Some(name) => {
            let len = name.chars().count();
            if len < USERNAME_MIN_LEN {
                result.push(format!("Username must be at least {} characters", USERNAME_MIN_LEN));
            } else if len > USERNAME_MAX_LEN {
                result.push(format!("Username must not exceed {} characters", USERNAME_MAX_LEN));
            }
        }
    }

    check_email(&mut result, email);

    // Passwords are checked untrimmed; only an all-blank value counts as missing
    let password = password.filter(|p| !p.trim().is_empty());
    match password {
        None => result.required("Password"),
        Some(p) if p.chars().count() < PASSWORD_MIN_LEN => {
            result.push(format!("Password must be at least {} characters", PASSWORD_MIN_LEN));
        }
        Some(_) => {}
    }

    let confirm_password = confirm_password.filter(|p| !p.trim().is_empty());
    if confirm_password.is_none() {
        result.required("Confirm password");
    }

    if let (Some(p), Some(c)) = (password, confirm_password) {
        if p != c {
            result.push("Password and confirm password do not match");
        }
    }

    result
}

pub fn validate_login(email: Option<&str>, password: Option<&str>) -> ValidationResult {
    let mut result = ValidationResult::new();

    check_email(&mut result, email);

    if password.filter(|p| !p.trim().is_empty()).is_none() {
        result.required("Password");
    }

    result
}

fn check_email(result: &mut ValidationResult, email: Option<&str>) {
    match present(email) {
        None => result.required("Email"),
        Some(e) if !is_valid_email(e) => result.push("Email is not valid"),
        Some(_) => {}
    }
}
