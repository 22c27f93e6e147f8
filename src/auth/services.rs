use lazy_static::lazy_static;
use regex::Regex;

use super::dto::{ProfileRequest, RegisterRequest};
use crate::error::{AppError, FieldErrors};

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    static ref NAME_RE: Regex = Regex::new(r"^[a-zA-ZæøåÆØÅ]+$").unwrap();
    static ref UPPER_RE: Regex = Regex::new(r"[A-ZÆØÅ]").unwrap();
    static ref LOWER_RE: Regex = Regex::new(r"[a-zæøå]").unwrap();
    static ref DIGIT_RE: Regex = Regex::new(r"[0-9]").unwrap();
    static ref SPECIAL_RE: Regex = Regex::new(r"[^A-Za-z0-9]").unwrap();
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

fn check_name(errors: &mut FieldErrors, field: &str, label: &str, value: &str) {
    if value.is_empty() {
        errors.push(field, &format!("{label} is required"));
    } else if value.chars().count() < 2 {
        errors.push(field, &format!("{label} must be at least 2 characters"));
    } else if !NAME_RE.is_match(value) {
        errors.push(field, &format!("{label} can only contain letters"));
    }
}

fn check_email(errors: &mut FieldErrors, email: &str) {
    if email.is_empty() {
        errors.push("email", "Email is required");
    } else if !is_valid_email(email) {
        errors.push("email", "Invalid email format");
    }
}

/// Reports only the first unmet rule so the message stays actionable.
fn check_password(errors: &mut FieldErrors, password: &str) {
    let rule = if password.is_empty() {
        Some("Password is required")
    } else if password.chars().count() < 8 {
        Some("Password must be at least 8 characters")
    } else if !UPPER_RE.is_match(password) {
        Some("Password must contain at least one uppercase letter")
    } else if !LOWER_RE.is_match(password) {
        Some("Password must contain at least one lowercase letter")
    } else if !DIGIT_RE.is_match(password) {
        Some("Password must contain at least one number")
    } else if !SPECIAL_RE.is_match(password) {
        Some("Password must contain at least one special character")
    } else {
        None
    };
    if let Some(message) = rule {
        errors.push("password", message);
    }
}

pub fn validate_registration(req: &RegisterRequest) -> Result<(), AppError> {
    let mut errors = FieldErrors::new();
    check_name(&mut errors, "firstName", "First name", &req.first_name);
    check_name(&mut errors, "lastName", "Last name", &req.last_name);
    check_email(&mut errors, &req.email);
    check_password(&mut errors, &req.password);
    if req.confirm_password.is_empty() {
        errors.push("confirmPassword", "Confirm password is required");
    } else if req.password != req.confirm_password {
        errors.push("confirmPassword", "Passwords do not match");
    }
    errors.into_result()
}

pub fn validate_profile(req: &ProfileRequest) -> Result<(), AppError> {
    let mut errors = FieldErrors::new();
    check_name(&mut errors, "firstName", "First name", &req.first_name);
    check_name(&mut errors, "lastName", "Last name", &req.last_name);
    check_email(&mut errors, &req.email);
    if let Some(password) = req.password.as_deref().filter(|p| !p.is_empty()) {
        check_password(&mut errors, password);
    }
    errors.into_result()
}
