use crate::error::ValidationError;
use chrono::{DateTime, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;

/// Shape validation shared by every service.
///
/// Services call these before touching storage so that malformed input never
/// reaches a query.
/// Lazy-loaded email validation regex
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("Invalid email regex pattern")
});

/// Validates an email address
///
/// # Examples
///
/// ```rust
/// use ade_core::validation::validate_email;
///
/// assert!(validate_email("agence.centre@ade.dz").is_ok());
/// assert!(validate_email("invalid-email").is_err());
/// ```
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::MissingField(
            "Email is required".to_string(),
        ));
    }

    if email.len() > 254 {
        return Err(ValidationError::InvalidEmail(
            "Email is too long".to_string(),
        ));
    }

    if EMAIL_REGEX.is_match(email) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail(format!(
            "Invalid email format: {email}"
        )))
    }
}

/// Validates an optional email, treating blank values as absent.
pub fn validate_optional_email(email: Option<&str>) -> Result<(), ValidationError> {
    match email.map(str::trim) {
        Some(email) if !email.is_empty() => validate_email(email),
        _ => Ok(()),
    }
}

/// Validates a password for a new or changed account.
///
/// # Password Requirements
///
/// - Minimum 6 characters
/// - Maximum 128 characters
/// - Cannot be empty or whitespace only
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::MissingField(
            "Password is required".to_string(),
        ));
    }

    if password.trim().is_empty() {
        return Err(ValidationError::InvalidPassword(
            "Password cannot be only whitespace".to_string(),
        ));
    }

    if password.chars().count() < 6 {
        return Err(ValidationError::InvalidPassword(
            "Password must be at least 6 characters long".to_string(),
        ));
    }

    if password.len() > 128 {
        return Err(ValidationError::InvalidPassword(
            "Password must be no more than 128 characters long".to_string(),
        ));
    }

    Ok(())
}

/// Returns the trimmed value of a required text field.
///
/// ```rust
/// use ade_core::validation::require_text;
///
/// assert_eq!(require_text("nomCentre", "  Centre Est ", 100).unwrap(), "Centre Est");
/// assert!(require_text("nomCentre", "   ", 100).is_err());
/// ```
pub fn require_text(field: &str, value: &str, max_len: usize) -> Result<String, ValidationError> {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::MissingField(field.to_string()));
    }

    if trimmed.chars().count() > max_len {
        return Err(ValidationError::InvalidField(format!(
            "{field} must be no more than {max_len} characters long"
        )));
    }

    Ok(trimmed.to_string())
}

/// Trims an optional text field, mapping blank values to `None`.
pub fn optional_text(
    field: &str,
    value: Option<&str>,
    max_len: usize,
) -> Result<Option<String>, ValidationError> {
    match value.map(str::trim) {
        Some(trimmed) if !trimmed.is_empty() => {
            if trimmed.chars().count() > max_len {
                return Err(ValidationError::InvalidField(format!(
                    "{field} must be no more than {max_len} characters long"
                )));
            }
            Ok(Some(trimmed.to_string()))
        }
        _ => Ok(None),
    }
}

pub fn require_non_negative_count(field: &str, value: i64) -> Result<(), ValidationError> {
    if value < 0 {
        return Err(ValidationError::InvalidField(format!(
            "{field} must not be negative"
        )));
    }
    Ok(())
}

pub fn require_non_negative_amount(field: &str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::InvalidField(format!(
            "{field} must be a finite number"
        )));
    }
    if value < 0.0 {
        return Err(ValidationError::InvalidField(format!(
            "{field} must not be negative"
        )));
    }
    Ok(())
}

/// Parses a calendar date sent by a client.
///
/// Accepts `YYYY-MM-DD` as well as RFC 3339 timestamps, keeping only the date.
///
/// ```rust
/// use ade_core::validation::parse_date;
///
/// assert!(parse_date("dateDebut", "2025-06-01").is_ok());
/// assert!(parse_date("dateDebut", "2025-06-01T00:00:00Z").is_ok());
/// assert!(parse_date("dateDebut", "01/06/2025").is_err());
/// ```
pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate, ValidationError> {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::MissingField(field.to_string()));
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }

    DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.date_naive())
        .map_err(|_| ValidationError::InvalidDate(format!("{field}: {trimmed}")))
}
