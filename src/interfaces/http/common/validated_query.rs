//! Validated query-string extractor
//!
//! Deserializes query parameters with axum's `Query` and runs
//! `validator::Validate` before the handler sees them. Every failing field
//! is reported in a single 400 response.

use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use super::error::ApiError;
use crate::domain::FieldViolation;

/// Query parameters that passed validation.
///
/// ```ignore
/// async fn handler(ValidatedQuery(params): ValidatedQuery<ListParams>) {
///     // every field rule on `ListParams` holds here
/// }
/// ```
pub struct ValidatedQuery<T>(pub T);

/// Rejection for `ValidatedQuery` extraction failures.
pub enum ValidatedQueryRejection {
    /// The query string could not be deserialized.
    Malformed(String),
    /// One or more fields failed validation.
    Invalid(ValidationErrors),
}

impl IntoResponse for ValidatedQueryRejection {
    fn into_response(self) -> Response {
        let violations = match self {
            Self::Malformed(reason) => vec![FieldViolation::new("query", reason)],
            Self::Invalid(errors) => violations(&errors),
        };
        ApiError::validation(violations).into_response()
    }
}

/// Flatten `ValidationErrors` into field violations ordered by field name.
pub fn violations(errors: &ValidationErrors) -> Vec<FieldViolation> {
    let mut out: Vec<FieldViolation> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| default_message(&e.code).to_string());
                FieldViolation::new(field.to_string(), message)
            })
        })
        .collect();
    out.sort_by(|a, b| a.field.cmp(&b.field));
    out
}

fn default_message(code: &str) -> &'static str {
    match code {
        "required" => "is required",
        _ => "is invalid",
    }
}

impl<S, T> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ValidatedQueryRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ValidatedQueryRejection::Malformed(rejection.body_text()))?;

        value.validate().map_err(ValidatedQueryRejection::Invalid)?;

        Ok(ValidatedQuery(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::get;
    use axum::Router;
    use serde::Deserialize;
    use tower::ServiceExt;

    use crate::shared::validations::validate_limit;

    #[derive(Debug, Deserialize, Validate)]
    struct TestParams {
        #[validate(required, length(min = 3, message = "must be at least 3 characters"))]
        name: Option<String>,
        #[validate(custom(function = "validate_limit"))]
        limit: Option<String>,
    }

    async fn handler(ValidatedQuery(params): ValidatedQuery<TestParams>) -> String {
        params.name.unwrap_or_default()
    }

    async fn send(uri: &str) -> (StatusCode, serde_json::Value) {
        let app = Router::new().route("/test", get(handler));
        let resp = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn valid_query_reaches_handler() {
        let (status, _) = send("/test?name=alice&limit=10").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn every_failing_field_is_reported() {
        let (status, body) = send("/test?limit=abc").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");

        let details = body["details"].as_array().unwrap();
        assert_eq!(details.len(), 2);
        assert_eq!(details[0]["field"], "limit");
        assert_eq!(details[1]["field"], "name");
        assert_eq!(details[1]["message"], "is required");
    }

    #[tokio::test]
    async fn custom_message_is_used() {
        let (status, body) = send("/test?name=ab").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"][0]["message"], "must be at least 3 characters");
    }
}
