//! Domain errors

use chrono::NaiveDate;
use thiserror::Error;

/// A single rejected input field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Domain-level error types
#[derive(Debug, Error)]
pub enum DomainError {
    /// One or more inputs failed validation. Every failing field is listed.
    #[error("Validation failed: {}", format_violations(.0))]
    Validation(Vec<FieldViolation>),

    #[error("End date {end} must not be before start date {start}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Database error: {0}")]
    Storage(String),
}

impl DomainError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldViolation::new(field, message)])
    }
}

fn format_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("{}: {}", v.field, v.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_lists_every_field() {
        let err = DomainError::Validation(vec![
            FieldViolation::new("limit", "must be an integer between 1 and 100"),
            FieldViolation::new("offset", "must be a non-negative integer"),
        ]);
        let msg = err.to_string();
        assert!(msg.contains("limit: must be an integer between 1 and 100"));
        assert!(msg.contains("offset: must be a non-negative integer"));
    }

    #[test]
    fn date_range_message_names_both_dates() {
        let err = DomainError::InvalidDateRange {
            start: NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "End date 2024-03-01 must not be before start date 2024-03-10"
        );
    }
}
