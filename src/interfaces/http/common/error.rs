//! HTTP error envelope
//!
//! Every failure is answered with `{ error, details?, code? }`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use crate::domain::{DomainError, FieldViolation};

pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
pub const INVALID_DATE_RANGE: &str = "INVALID_DATE_RANGE";
pub const NOT_FOUND: &str = "NOT_FOUND";
pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
pub const RATE_LIMITED: &str = "RATE_LIMITED";
pub const REQUEST_TIMEOUT: &str = "REQUEST_TIMEOUT";

/// A single rejected field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    pub field: String,
    pub message: String,
}

impl From<FieldViolation> for ErrorDetail {
    fn from(v: FieldViolation) -> Self {
        Self {
            field: v.field,
            message: v.message,
        }
    }
}

/// Error response body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ErrorDetail>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: &str) -> Self {
        Self {
            error: error.into(),
            details: None,
            code: Some(code.to_string()),
        }
    }

    pub fn with_details(mut self, details: Vec<ErrorDetail>) -> Self {
        self.details = Some(details);
        self
    }
}

/// Error returned by every HTTP handler
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl ApiError {
    pub fn validation(violations: Vec<FieldViolation>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorResponse::new("Validation failed", VALIDATION_ERROR)
                .with_details(violations.into_iter().map(ErrorDetail::from).collect()),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            body: ErrorResponse::new(message, NOT_FOUND),
        }
    }

    pub fn request_timeout() -> Self {
        Self {
            status: StatusCode::REQUEST_TIMEOUT,
            body: ErrorResponse::new("Request timed out", REQUEST_TIMEOUT),
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(violations) => Self::validation(violations),
            DomainError::InvalidDateRange { .. } => Self {
                status: StatusCode::BAD_REQUEST,
                body: ErrorResponse::new(err.to_string(), INVALID_DATE_RANGE),
            },
            DomainError::NotFound { .. } => Self::not_found(err.to_string()),
            DomainError::Storage(_) => {
                error!("Request failed: {}", err);
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    body: ErrorResponse::new(err.to_string(), INTERNAL_ERROR),
                }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn validation_lists_every_field() {
        let err = ApiError::from(DomainError::Validation(vec![
            FieldViolation::new("start", "is required"),
            FieldViolation::new("limit", "must be an integer between 1 and 100"),
        ]));
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.body.code.as_deref(), Some(VALIDATION_ERROR));
        assert_eq!(err.body.details.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn inverted_range_is_bad_request() {
        let err = ApiError::from(DomainError::InvalidDateRange {
            start: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        });
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.body.code.as_deref(), Some(INVALID_DATE_RANGE));
        assert!(err.body.details.is_none());
    }

    #[test]
    fn storage_failure_is_internal() {
        let err = ApiError::from(DomainError::Storage("connection refused".into()));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.body.error, "Database error: connection refused");
    }

    #[test]
    fn optional_fields_are_omitted() {
        let json = serde_json::to_value(ErrorResponse::new("gone", NOT_FOUND)).unwrap();
        assert_eq!(json, serde_json::json!({"error": "gone", "code": "NOT_FOUND"}));
    }
}
