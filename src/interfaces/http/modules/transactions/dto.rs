//! Transaction DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::domain::{BucketInterval, DomainError, DomainResult, PageWindow, TimeBucket, Transaction};
use crate::shared::validations::{
    parse_date, parse_limit, parse_offset, validate_date, validate_interval, validate_limit,
    validate_offset,
};
use crate::shared::{PaginatedResult, Pagination};
use crate::application::SearchResult;

pub const DEFAULT_PAGE_LIMIT: u64 = 25;
pub const DEFAULT_BUCKET_LIMIT: u64 = 30;

fn window(limit: Option<&str>, offset: Option<&str>) -> PageWindow {
    PageWindow::new(
        limit.and_then(parse_limit).unwrap_or(DEFAULT_PAGE_LIMIT),
        offset.and_then(parse_offset).unwrap_or(0),
    )
}

fn required_date(field: &str, raw: Option<&str>) -> DomainResult<NaiveDate> {
    raw.and_then(parse_date)
        .ok_or_else(|| DomainError::validation(field, "must be a valid ISO 8601 date (YYYY-MM-DD)"))
}

// ── Query parameters ────────────────────────────────────────────

/// `GET /transactions`
#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// Page size, 1..=100 (default 25)
    #[param(value_type = Option<u64>, example = 25)]
    #[validate(custom(function = "validate_limit"))]
    pub limit: Option<String>,
    /// Rows to skip (default 0)
    #[param(value_type = Option<u64>, example = 0)]
    #[validate(custom(function = "validate_offset"))]
    pub offset: Option<String>,
}

impl ListParams {
    pub fn window(&self) -> PageWindow {
        window(self.limit.as_deref(), self.offset.as_deref())
    }
}

/// `GET /transactions/range`
#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RangeParams {
    /// First day, inclusive (YYYY-MM-DD)
    #[param(value_type = String, required = true, example = "2024-01-01")]
    #[validate(required, custom(function = "validate_date"))]
    pub start: Option<String>,
    /// Last day, inclusive (YYYY-MM-DD)
    #[param(value_type = String, required = true, example = "2024-01-31")]
    #[validate(required, custom(function = "validate_date"))]
    pub end: Option<String>,
    #[param(value_type = Option<u64>, example = 25)]
    #[validate(custom(function = "validate_limit"))]
    pub limit: Option<String>,
    #[param(value_type = Option<u64>, example = 0)]
    #[validate(custom(function = "validate_offset"))]
    pub offset: Option<String>,
}

impl RangeParams {
    pub fn window(&self) -> PageWindow {
        window(self.limit.as_deref(), self.offset.as_deref())
    }

    pub fn dates(&self) -> DomainResult<(NaiveDate, NaiveDate)> {
        Ok((
            required_date("start", self.start.as_deref())?,
            required_date("end", self.end.as_deref())?,
        ))
    }
}

/// `GET /transactions/by-time`
#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ByTimeParams {
    /// Bucket width, e.g. `1 hour`
    #[param(value_type = String, required = true, example = "1 hour")]
    #[validate(required, custom(function = "validate_interval"))]
    pub interval: Option<String>,
    /// Number of buckets, 1..=100 (default 30)
    #[param(value_type = Option<u64>, example = 30)]
    #[validate(custom(function = "validate_limit"))]
    pub limit: Option<String>,
}

impl ByTimeParams {
    pub fn interval(&self) -> DomainResult<BucketInterval> {
        self.interval
            .as_deref()
            .and_then(|raw| raw.parse().ok())
            .ok_or_else(|| {
                DomainError::validation(
                    "interval",
                    format!("must be one of: {}", BucketInterval::allowed_values()),
                )
            })
    }

    pub fn limit(&self) -> u64 {
        self.limit
            .as_deref()
            .and_then(parse_limit)
            .unwrap_or(DEFAULT_BUCKET_LIMIT)
    }
}

/// `GET /transactions/search`
#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Hash fragment, at least 3 characters
    #[param(value_type = String, required = true, example = "a1b2c3")]
    #[validate(required, length(min = 3, message = "must be at least 3 characters"))]
    pub term: Option<String>,
    #[param(value_type = Option<u64>, example = 25)]
    #[validate(custom(function = "validate_limit"))]
    pub limit: Option<String>,
}

impl SearchParams {
    pub fn term(&self) -> &str {
        self.term.as_deref().unwrap_or_default()
    }

    pub fn limit(&self) -> u64 {
        self.limit
            .as_deref()
            .and_then(parse_limit)
            .unwrap_or(DEFAULT_PAGE_LIMIT)
    }
}

// ── Responses ───────────────────────────────────────────────────

/// Bitcoin transaction. Amounts are decimal strings.
#[derive(Debug, Serialize, ToSchema)]
pub struct TransactionDto {
    pub hash: String,
    pub block_id: i64,
    pub time: DateTime<Utc>,
    #[schema(value_type = String, example = "0.50000000")]
    pub output_total: Decimal,
    #[schema(value_type = String, example = "21034.55")]
    pub output_total_usd: Decimal,
    #[schema(value_type = String, example = "0.00012000")]
    pub fee: Decimal,
    pub size: i32,
}

impl From<Transaction> for TransactionDto {
    fn from(tx: Transaction) -> Self {
        Self {
            hash: tx.hash,
            block_id: tx.block_id,
            time: tx.time,
            output_total: tx.output_total,
            output_total_usd: tx.output_total_usd,
            fee: tx.fee,
            size: tx.size,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginationDto {
    pub limit: u64,
    pub offset: u64,
    pub current_page: u64,
    pub total_pages: u64,
}

impl From<Pagination> for PaginationDto {
    fn from(p: Pagination) -> Self {
        Self {
            limit: p.limit,
            offset: p.offset,
            current_page: p.current_page,
            total_pages: p.total_pages,
        }
    }
}

/// `{rows, totalCount, pagination}`
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPageDto {
    pub rows: Vec<TransactionDto>,
    pub total_count: u64,
    pub pagination: PaginationDto,
}

impl From<PaginatedResult<Transaction>> for TransactionPageDto {
    fn from(page: PaginatedResult<Transaction>) -> Self {
        Self {
            rows: page.rows.into_iter().map(TransactionDto::from).collect(),
            total_count: page.total,
            pagination: page.pagination.into(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultDto {
    pub rows: Vec<TransactionDto>,
    pub total_count: u64,
}

impl From<SearchResult> for SearchResultDto {
    fn from(result: SearchResult) -> Self {
        Self {
            rows: result.rows.into_iter().map(TransactionDto::from).collect(),
            total_count: result.total,
        }
    }
}

/// Aggregates for one time bucket
#[derive(Debug, Serialize, ToSchema)]
pub struct TimeBucketDto {
    pub bucket: DateTime<Utc>,
    pub transaction_count: i64,
    #[schema(value_type = String)]
    pub total_volume: Decimal,
    #[schema(value_type = String)]
    pub avg_fee: Decimal,
    #[schema(value_type = String)]
    pub max_transaction: Decimal,
    #[schema(value_type = String)]
    pub min_transaction: Decimal,
}

impl From<TimeBucket> for TimeBucketDto {
    fn from(b: TimeBucket) -> Self {
        Self {
            bucket: b.bucket,
            transaction_count: b.transaction_count,
            total_volume: b.total_volume,
            avg_fee: b.avg_fee,
            max_transaction: b.max_transaction,
            min_transaction: b.min_transaction,
        }
    }
}
