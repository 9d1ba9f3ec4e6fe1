//! Request field checks shared by the handlers.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::AppError;

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));

#[must_use]
pub fn is_email(value: &str) -> bool {
    EMAIL.is_match(value)
}

pub fn email(field: &str, value: &str) -> Result<(), AppError> {
    if is_email(value) {
        Ok(())
    } else {
        Err(AppError::Validation(format!("{field} is not a valid email address")))
    }
}

/// Trims the value and rejects it when nothing is left.
pub fn required<'a>(field: &str, value: Option<&'a str>) -> Result<&'a str, AppError> {
    match value.map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(AppError::Validation(format!("{field} is required"))),
    }
}

pub fn present<T>(field: &str, value: Option<T>) -> Result<T, AppError> {
    value.ok_or_else(|| AppError::Validation(format!("{field} is required")))
}

pub fn not_blank(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        Err(AppError::Validation(format!("{field} is required")))
    } else {
        Ok(())
    }
}

pub fn non_negative(field: &str, value: i32) -> Result<(), AppError> {
    if value < 0 {
        Err(AppError::Validation(format!("{field} must not be negative")))
    } else {
        Ok(())
    }
}

pub fn one_of(field: &str, value: &str, allowed: &[&str]) -> Result<(), AppError> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "{field} must be one of {}",
            allowed.join(", ")
        )))
    }
}

/// `end` may be open, but never before `start`.
pub fn ordered<T: PartialOrd>(
    start_field: &str,
    start: &T,
    end_field: &str,
    end: Option<&T>,
) -> Result<(), AppError> {
    match end {
        Some(end) if end < start => Err(AppError::Validation(format!(
            "{end_field} must not be before {start_field}"
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn emails() {
        assert!(is_email("ana.garcia@residencia.com"));
        assert!(!is_email("ana.garcia@residencia"));
        assert!(!is_email("ana garcia@residencia.com"));
        assert!(!is_email(""));
    }

    #[test]
    fn required_trims() {
        assert_eq!(required("name", Some("  Ana ")).unwrap(), "Ana");
        assert!(required("name", Some("   ")).is_err());
        assert!(required("name", None).is_err());
    }

    #[test]
    fn ranges_may_be_open() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let before = NaiveDate::from_ymd_opt(2024, 2, 28).unwrap();
        assert!(ordered("startDate", &start, "endDate", None).is_ok());
        assert!(ordered("startDate", &start, "endDate", Some(&start)).is_ok());
        assert!(ordered("startDate", &start, "endDate", Some(&before)).is_err());
    }
}
