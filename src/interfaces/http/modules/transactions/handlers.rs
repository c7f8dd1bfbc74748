//! Transaction API handlers

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue},
    Json,
};

use super::dto::{
    ByTimeParams, ListParams, RangeParams, SearchParams, SearchResultDto, TimeBucketDto,
    TransactionDto, TransactionPageDto,
};
use crate::application::TransactionQueryService;
use crate::interfaces::http::common::{ApiError, ApiPath, ErrorResponse, ValidatedQuery};
use crate::shared::Pagination;

pub const X_TOTAL_COUNT: &str = "x-total-count";
pub const X_TOTAL_PAGES: &str = "x-total-pages";
pub const X_CURRENT_PAGE: &str = "x-current-page";
pub const X_PER_PAGE: &str = "x-per-page";

/// Transaction handler state
#[derive(Clone)]
pub struct TransactionAppState {
    pub service: Arc<TransactionQueryService>,
}

fn insert(headers: &mut HeaderMap, name: &'static str, value: u64) {
    headers.insert(HeaderName::from_static(name), HeaderValue::from(value));
}

fn page_headers(total: u64, pagination: &Pagination) -> HeaderMap {
    let mut headers = HeaderMap::new();
    insert(&mut headers, X_TOTAL_COUNT, total);
    insert(&mut headers, X_TOTAL_PAGES, pagination.total_pages);
    insert(&mut headers, X_CURRENT_PAGE, pagination.current_page);
    insert(&mut headers, X_PER_PAGE, pagination.limit);
    headers
}

#[utoipa::path(
    get,
    path = "/transactions",
    tag = "Transactions",
    params(ListParams),
    responses(
        (status = 200, description = "Newest transactions first", body = TransactionPageDto),
        (status = 400, description = "Invalid limit or offset", body = ErrorResponse),
        (status = 500, description = "Database error", body = ErrorResponse)
    )
)]
pub async fn list_transactions(
    State(state): State<TransactionAppState>,
    ValidatedQuery(params): ValidatedQuery<ListParams>,
) -> Result<(HeaderMap, Json<TransactionPageDto>), ApiError> {
    let page = state.service.list(params.window()).await?;
    let headers = page_headers(page.total, &page.pagination);
    Ok((headers, Json(page.into())))
}

#[utoipa::path(
    get,
    path = "/transactions/range",
    tag = "Transactions",
    params(RangeParams),
    responses(
        (status = 200, description = "Transactions between two dates, inclusive", body = TransactionPageDto),
        (status = 400, description = "Missing or invalid dates, or end before start", body = ErrorResponse),
        (status = 500, description = "Database error", body = ErrorResponse)
    )
)]
pub async fn list_transactions_in_range(
    State(state): State<TransactionAppState>,
    ValidatedQuery(params): ValidatedQuery<RangeParams>,
) -> Result<(HeaderMap, Json<TransactionPageDto>), ApiError> {
    let (start, end) = params.dates()?;
    let page = state
        .service
        .list_range(start, end, params.window())
        .await?;
    let headers = page_headers(page.total, &page.pagination);
    Ok((headers, Json(page.into())))
}

#[utoipa::path(
    get,
    path = "/transactions/by-time",
    tag = "Transactions",
    params(ByTimeParams),
    responses(
        (status = 200, description = "Most recent buckets first", body = [TimeBucketDto]),
        (status = 400, description = "Unknown interval or invalid limit", body = ErrorResponse),
        (status = 500, description = "Database error", body = ErrorResponse)
    )
)]
pub async fn transactions_by_time(
    State(state): State<TransactionAppState>,
    ValidatedQuery(params): ValidatedQuery<ByTimeParams>,
) -> Result<Json<Vec<TimeBucketDto>>, ApiError> {
    let buckets = state
        .service
        .by_time(params.interval()?, params.limit())
        .await?;
    Ok(Json(buckets.into_iter().map(TimeBucketDto::from).collect()))
}

#[utoipa::path(
    get,
    path = "/transactions/search",
    tag = "Transactions",
    params(SearchParams),
    responses(
        (status = 200, description = "Transactions whose hash contains the term", body = SearchResultDto),
        (status = 400, description = "Term shorter than 3 characters", body = ErrorResponse),
        (status = 500, description = "Database error", body = ErrorResponse)
    )
)]
pub async fn search_transactions(
    State(state): State<TransactionAppState>,
    ValidatedQuery(params): ValidatedQuery<SearchParams>,
) -> Result<(HeaderMap, Json<SearchResultDto>), ApiError> {
    let result = state
        .service
        .search(params.term(), params.limit())
        .await?;
    let mut headers = HeaderMap::new();
    insert(&mut headers, X_TOTAL_COUNT, result.total);
    Ok((headers, Json(result.into())))
}

#[utoipa::path(
    get,
    path = "/transaction/{hash}",
    tag = "Transactions",
    params(("hash" = String, Path, description = "Transaction hash")),
    responses(
        (status = 200, description = "Transaction details", body = TransactionDto),
        (status = 400, description = "Undecodable hash", body = ErrorResponse),
        (status = 404, description = "No transaction with this hash", body = ErrorResponse),
        (status = 500, description = "Database error", body = ErrorResponse)
    )
)]
pub async fn get_transaction(
    State(state): State<TransactionAppState>,
    ApiPath(hash): ApiPath<String>,
) -> Result<Json<TransactionDto>, ApiError> {
    let tx = state.service.find_by_hash(&hash).await?;
    Ok(Json(tx.into()))
}
