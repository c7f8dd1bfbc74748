//! Shared HTTP building blocks

pub mod api_path;
pub mod error;
pub mod validated_query;

pub use api_path::ApiPath;
pub use error::{ApiError, ErrorDetail, ErrorResponse};
pub use validated_query::ValidatedQuery;
