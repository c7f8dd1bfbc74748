//! Query parameter parsing and `validator` custom rules.
//!
//! Query DTOs keep raw `Option<String>` fields so a malformed value is
//! reported alongside every other failing field instead of aborting
//! deserialization. The `validate_*` functions plug into
//! `#[validate(custom(function = ...))]`; the `parse_*` functions convert a
//! value that already passed validation.

use std::borrow::Cow;

use chrono::{DateTime, NaiveDate};
use validator::ValidationError;

use crate::domain::BucketInterval;

/// Largest page size any endpoint accepts.
pub const MAX_LIMIT: u64 = 100;

pub fn parse_limit(raw: &str) -> Option<u64> {
    raw.parse::<u64>()
        .ok()
        .filter(|limit| (1..=MAX_LIMIT).contains(limit))
}

pub fn parse_offset(raw: &str) -> Option<u64> {
    raw.parse::<u64>().ok()
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp, whose UTC date is used.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().or_else(|| {
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.naive_utc().date())
    })
}

fn violation(code: &'static str, message: String, value: &str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Owned(message));
    err.add_param(Cow::from("value"), &value);
    err
}

pub fn validate_limit(value: &str) -> Result<(), ValidationError> {
    match parse_limit(value) {
        Some(_) => Ok(()),
        None => Err(violation(
            "limit",
            format!("must be an integer between 1 and {}", MAX_LIMIT),
            value,
        )),
    }
}

pub fn validate_offset(value: &str) -> Result<(), ValidationError> {
    match parse_offset(value) {
        Some(_) => Ok(()),
        None => Err(violation(
            "offset",
            "must be a non-negative integer".to_string(),
            value,
        )),
    }
}

pub fn validate_date(value: &str) -> Result<(), ValidationError> {
    match parse_date(value) {
        Some(_) => Ok(()),
        None => Err(violation(
            "date",
            "must be a valid ISO 8601 date (YYYY-MM-DD)".to_string(),
            value,
        )),
    }
}

pub fn validate_interval(value: &str) -> Result<(), ValidationError> {
    match value.parse::<BucketInterval>() {
        Ok(_) => Ok(()),
        Err(_) => Err(violation(
            "interval",
            format!("must be one of: {}", BucketInterval::allowed_values()),
            value,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_bounds() {
        assert_eq!(parse_limit("1"), Some(1));
        assert_eq!(parse_limit("100"), Some(100));
        assert_eq!(parse_limit("0"), None);
        assert_eq!(parse_limit("101"), None);
        assert_eq!(parse_limit("-5"), None);
        assert_eq!(parse_limit("2.5"), None);
        assert_eq!(parse_limit("ten"), None);
    }

    #[test]
    fn offset_must_be_non_negative_integer() {
        assert_eq!(parse_offset("0"), Some(0));
        assert_eq!(parse_offset("1000000"), Some(1_000_000));
        assert_eq!(parse_offset("-1"), None);
        assert_eq!(parse_offset("abc"), None);
    }

    #[test]
    fn dates_accept_plain_and_rfc3339() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(parse_date("2024-01-15"), Some(day));
        assert_eq!(parse_date("2024-01-15T10:00:00Z"), Some(day));
        assert_eq!(parse_date("2024-01-16T01:00:00+02:00"), Some(day));
        assert_eq!(parse_date("2024-02-30"), None);
        assert_eq!(parse_date("15/01/2024"), None);
    }

    #[test]
    fn interval_error_lists_allowed_values() {
        let err = validate_interval("3 hours").unwrap_err();
        let message = err.message.unwrap();
        assert!(message.contains("1 minute"));
        assert!(message.contains("1 month"));
        assert!(validate_interval("1 hour").is_ok());
    }

    #[test]
    fn limit_error_carries_value() {
        let err = validate_limit("500").unwrap_err();
        assert_eq!(err.code, "limit");
        assert!(err.params.contains_key("value"));
    }
}
