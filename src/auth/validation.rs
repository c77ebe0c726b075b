use lazy_static::lazy_static;
use regex::Regex;

use super::dto::{Credentials, LoginRequest, RegisterRequest, Registration};
use crate::error::{ApiError, FieldError};

const PASSWORD_MIN: usize = 6;
const PASSWORD_MAX: usize = 128;
const NAME_MAX: usize = 50;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn has_required_character_classes(password: &str) -> bool {
    password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
}

fn check_email(email: Option<&str>, errors: &mut Vec<FieldError>) -> Option<String> {
    let fail = |message| FieldError {
        field: "email",
        message,
    };
    match email.map(|e| e.trim().to_lowercase()) {
        None => {
            errors.push(fail("Email is required"));
            None
        }
        Some(e) if !is_valid_email(&e) => {
            errors.push(fail("Please provide a valid email address"));
            None
        }
        Some(e) => Some(e),
    }
}

fn check_name(
    value: Option<&str>,
    field: &'static str,
    messages: [&'static str; 3],
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    let [required, empty, too_long] = messages;
    let message = match value.map(str::trim) {
        None => required,
        Some("") => empty,
        Some(v) if v.chars().count() > NAME_MAX => too_long,
        Some(v) => return Some(v.to_string()),
    };
    errors.push(FieldError { field, message });
    None
}

/// Validates and normalizes a registration body. All problems are reported
/// at once.
pub fn validate_registration(req: RegisterRequest) -> Result<Registration, ApiError> {
    let mut errors = Vec::new();

    let email = check_email(req.email.as_deref(), &mut errors);

    let password = match req.password {
        None => {
            errors.push(FieldError {
                field: "password",
                message: "Password is required",
            });
            None
        }
        Some(p) => {
            let len = p.chars().count();
            let message = if len < PASSWORD_MIN {
                Some("Password must be at least 6 characters long")
            } else if len > PASSWORD_MAX {
                Some("Password must not exceed 128 characters")
            } else if !has_required_character_classes(&p) {
                Some("Password must contain at least one lowercase letter, one uppercase letter, and one number")
            } else {
                None
            };
            match message {
                Some(message) => {
                    errors.push(FieldError {
                        field: "password",
                        message,
                    });
                    None
                }
                None => Some(p),
            }
        }
    };

    let first_name = check_name(
        req.first_name.as_deref(),
        "firstName",
        [
            "First name is required",
            "First name cannot be empty",
            "First name must not exceed 50 characters",
        ],
        &mut errors,
    );
    let last_name = check_name(
        req.last_name.as_deref(),
        "lastName",
        [
            "Last name is required",
            "Last name cannot be empty",
            "Last name must not exceed 50 characters",
        ],
        &mut errors,
    );

    match (email, password, first_name, last_name) {
        (Some(email), Some(password), Some(first_name), Some(last_name)) if errors.is_empty() => {
            Ok(Registration {
                email,
                password,
                first_name,
                last_name,
            })
        }
        _ => Err(ApiError::Validation(errors)),
    }
}

pub fn validate_login(req: LoginRequest) -> Result<Credentials, ApiError> {
    let mut errors = Vec::new();
    let email = check_email(req.email.as_deref(), &mut errors);
    let password = match req.password {
        Some(p) if !p.is_empty() => Some(p),
        _ => {
            errors.push(FieldError {
                field: "password",
                message: "Password is required",
            });
            None
        }
    };

    match (email, password) {
        (Some(email), Some(password)) if errors.is_empty() => Ok(Credentials { email, password }),
        _ => Err(ApiError::Validation(errors)),
    }
}
