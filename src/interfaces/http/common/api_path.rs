//! Path extractor whose rejection uses the API error envelope

use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

use super::error::ApiError;
use crate::domain::FieldViolation;

/// `axum::extract::Path` that rejects with a 400 `VALIDATION_ERROR` body.
pub struct ApiPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                ApiError::validation(vec![FieldViolation::new("path", rejection.body_text())])
            })?;
        Ok(ApiPath(value))
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    use super::*;

    async fn echo(ApiPath(hash): ApiPath<String>) -> String {
        hash
    }

    async fn send(uri: &str) -> (StatusCode, Vec<u8>) {
        let resp = Router::new()
            .route("/item/{hash}", get(echo))
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes.to_vec())
    }

    #[tokio::test]
    async fn decoded_segment_reaches_handler() {
        let (status, body) = send("/item/ab%20cd").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"ab cd");
    }

    #[tokio::test]
    async fn invalid_utf8_is_enveloped() {
        let (status, body) = send("/item/%FF").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["code"], "VALIDATION_ERROR");
        assert_eq!(json["details"][0]["field"], "path");
    }
}
